//! `classify` command: run one title through the classifier and extractor

use anyhow::Result;
use clap::Args;

use dealscout::catalog::VehicleCatalog;
use dealscout::classifier::VehicleClassifier;
use dealscout::extract::FieldExtractor;

use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Listing title text
    pub title: String,

    /// Detail-page text to include in the decision
    #[arg(long)]
    pub detail: Option<String>,
}

pub fn execute(args: ClassifyArgs) -> Result<()> {
    let classifier = VehicleClassifier::new(Arc::new(VehicleCatalog::japan_suv()));
    let extractor = FieldExtractor::new();

    let result = classifier.classify(&args.title, args.detail.as_deref());
    println!("match:      {}", result.is_match);
    if !result.model_name.is_empty() {
        println!("model:      {}", result.model_name);
    }
    println!("confidence: {:.2}", result.confidence);

    let text = match &args.detail {
        Some(detail) => format!("{} {}", args.title, detail),
        None => args.title.clone(),
    };
    println!("price:      {}", extractor.extract_price(&text));
    println!("year:       {}", extractor.extract_year(&text));
    println!("mileage:    {}", extractor.extract_mileage(&text));
    println!("repair:     {}", extractor.detect_repair(&text));

    Ok(())
}
