use std::path::PathBuf;

use clap::Parser;
use douban_scraping::parser;
use scraper::Html;

#[derive(Parser)]
struct Opts {
    input_file: PathBuf,
    /// Report malformed entries instead of stopping at the first one.
    #[arg(long)]
    lenient: bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let opts = Opts::parse();
    let html = Html::parse_document(&fs_err::read_to_string(opts.input_file)?);

    let records = if opts.lenient {
        let (records, errors) = parser::parse_lenient(&html);
        for e in &errors {
            println!("error: {e:#}");
        }
        records
    } else {
        parser::parse(&html)?
    };
    for record in &records {
        println!("    {record:?}");
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
