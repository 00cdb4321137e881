use super::*;

#[test]
fn parses_categories_command() {
    let cli = Cli::try_parse_from(["adscope", "categories"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Categories));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["adscope"]).is_err());
}

#[test]
fn scrape_by_category_with_defaults() {
    let cli = Cli::try_parse_from(["adscope", "scrape", "--category", "vetements-homme"]).unwrap();
    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.category.as_deref(), Some("vetements-homme"));
    assert!(args.url.is_none());
    assert!(args.out.is_none());
    assert!(args.common.pages.is_none());
    assert!(args.common.format.is_none());
    assert!(args.common.columns.is_empty());
    assert!(!args.common.raw);
    assert!(args.common.filter().is_unrestricted());
}

#[test]
fn scrape_requires_a_target() {
    assert!(Cli::try_parse_from(["adscope", "scrape", "--pages", "3"]).is_err());
}

#[test]
fn scrape_rejects_category_and_url_together() {
    let result = Cli::try_parse_from([
        "adscope",
        "scrape",
        "--category",
        "telephones",
        "--url",
        "https://sn.coinafrique.com/categorie/telephones",
    ]);
    assert!(result.is_err());
}

#[test]
fn scrape_by_url_with_export_options() {
    let cli = Cli::try_parse_from([
        "adscope",
        "scrape",
        "--url",
        "https://sn.coinafrique.com/categorie/ordinateurs",
        "--pages",
        "3",
        "--format",
        "jsonl",
        "--out",
        "out/ordinateurs.jsonl",
        "--columns",
        "title,price_value,city",
    ])
    .unwrap();
    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.common.pages, Some(3));
    assert_eq!(args.common.format, Some(ExportFormat::Jsonl));
    assert_eq!(
        args.out.as_deref().and_then(|p| p.to_str()),
        Some("out/ordinateurs.jsonl")
    );
    assert_eq!(args.common.columns, vec!["title", "price_value", "city"]);
}

#[test]
fn scrape_filter_flags_build_listing_filter() {
    let cli = Cli::try_parse_from([
        "adscope",
        "scrape",
        "--category",
        "Téléphones",
        "--city",
        "Dakar",
        "--city",
        "Thiès",
        "--min-price",
        "10000",
        "--max-price",
        "500000",
    ])
    .unwrap();
    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    let filter = args.common.filter();
    assert_eq!(filter.cities, vec!["Dakar", "Thiès"]);
    assert_eq!(filter.min_price, Some(10_000));
    assert_eq!(filter.max_price, Some(500_000));
    assert!(filter.categories.is_empty());
}

#[test]
fn refresh_conflicts_with_no_cache() {
    let result = Cli::try_parse_from([
        "adscope",
        "scrape",
        "--category",
        "telephones",
        "--refresh",
        "--no-cache",
    ]);
    assert!(result.is_err());
}

#[test]
fn unknown_format_is_rejected() {
    let result = Cli::try_parse_from([
        "adscope",
        "scrape",
        "--category",
        "telephones",
        "--format",
        "xlsx",
    ]);
    assert!(result.is_err());
}

#[test]
fn scrape_all_with_out_dir_and_raw() {
    let cli = Cli::try_parse_from([
        "adscope",
        "scrape-all",
        "--pages",
        "2",
        "--format",
        "csv",
        "--out-dir",
        "exports/weekly",
        "--raw",
    ])
    .unwrap();
    let Commands::ScrapeAll(args) = cli.command else {
        panic!("expected scrape-all command");
    };
    assert_eq!(args.common.pages, Some(2));
    assert_eq!(args.common.format, Some(ExportFormat::Csv));
    assert!(args.common.raw);
    assert_eq!(
        args.out_dir.as_deref().and_then(|p| p.to_str()),
        Some("exports/weekly")
    );
}

#[test]
fn scrape_all_source_category_is_repeatable() {
    let cli = Cli::try_parse_from([
        "adscope",
        "scrape-all",
        "--source-category",
        "telephones",
        "--source-category",
        "Ordinateurs",
    ])
    .unwrap();
    let Commands::ScrapeAll(args) = cli.command else {
        panic!("expected scrape-all command");
    };
    assert_eq!(args.source_category, vec!["telephones", "Ordinateurs"]);
}

#[test]
fn scrape_rejects_source_category() {
    let result = Cli::try_parse_from([
        "adscope",
        "scrape",
        "--category",
        "telephones",
        "--source-category",
        "telephones",
    ]);
    assert!(result.is_err());
}
