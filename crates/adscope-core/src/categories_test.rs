use std::io::Write as _;
use std::path::Path;

use super::*;

fn write_temp_yaml(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("adscope-{}-{name}.yaml", std::process::id()));
    let mut file = std::fs::File::create(&path).expect("create temp yaml");
    file.write_all(contents.as_bytes()).expect("write temp yaml");
    path
}

#[test]
fn category_id_from_plain_url() {
    assert_eq!(
        category_id_from_url("https://sn.coinafrique.com/categorie/vetements-homme"),
        "vetements-homme"
    );
}

#[test]
fn category_id_ignores_query_and_trailing_slash() {
    assert_eq!(
        category_id_from_url("https://sn.coinafrique.com/categorie/telephones/?page=3"),
        "telephones"
    );
    assert_eq!(
        category_id_from_url("https://sn.coinafrique.com/categorie/ordinateurs#top"),
        "ordinateurs"
    );
}

#[test]
fn category_id_empty_for_bare_origin() {
    assert_eq!(category_id_from_url("https://sn.coinafrique.com"), "");
    assert_eq!(category_id_from_url("https://sn.coinafrique.com/"), "");
}

#[test]
fn builtin_registry_has_eight_valid_categories() {
    let categories = builtin_categories();
    assert_eq!(categories.len(), 8);
    assert!(validate_categories(&categories).is_ok());
    assert_eq!(categories[0].id(), "vetements-homme");
    assert_eq!(categories[7].id(), "ordinateurs");
}

#[test]
fn find_by_label_is_case_insensitive() {
    let registry = CategoryRegistry::builtin();
    let category = registry.find("chaussures femme").expect("category by label");
    assert_eq!(category.id(), "chaussures-femme");
}

#[test]
fn find_by_id() {
    let registry = CategoryRegistry::builtin();
    let category = registry.find("telephones").expect("category by id");
    assert_eq!(category.label, "Téléphones");
}

#[test]
fn find_unknown_returns_none() {
    let registry = CategoryRegistry::builtin();
    assert!(registry.find("voitures").is_none());
}

#[test]
fn validate_rejects_empty_label() {
    let categories = vec![CategoryConfig::new("  ", "https://example.com/categorie/a")];
    let err = validate_categories(&categories).unwrap_err();
    assert!(err.to_string().contains("label must be non-empty"));
}

#[test]
fn validate_rejects_non_http_url() {
    let categories = vec![CategoryConfig::new("A", "ftp://example.com/categorie/a")];
    let err = validate_categories(&categories).unwrap_err();
    assert!(err.to_string().contains("non-http URL"));
}

#[test]
fn validate_rejects_duplicate_label_case_insensitive() {
    let categories = vec![
        CategoryConfig::new("Phones", "https://example.com/categorie/a"),
        CategoryConfig::new("phones", "https://example.com/categorie/b"),
    ];
    let err = validate_categories(&categories).unwrap_err();
    assert!(err.to_string().contains("duplicate category label"));
}

#[test]
fn validate_rejects_duplicate_id() {
    let categories = vec![
        CategoryConfig::new("Phones", "https://example.com/categorie/telephones"),
        CategoryConfig::new("Mobiles", "https://other.example.com/categorie/telephones"),
    ];
    let err = validate_categories(&categories).unwrap_err();
    assert!(err.to_string().contains("duplicate category id"));
}

#[test]
fn validate_rejects_empty_registry() {
    let err = validate_categories(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn load_categories_from_yaml() {
    let path = write_temp_yaml(
        "valid",
        "categories:\n  - label: Montres\n    url: https://sn.coinafrique.com/categorie/montres\n",
    );
    let file = load_categories(&path).expect("valid categories file");
    std::fs::remove_file(&path).ok();
    assert_eq!(file.categories.len(), 1);
    assert_eq!(file.categories[0].id(), "montres");
}

#[test]
fn load_categories_missing_file_is_io_error() {
    let err = load_categories(Path::new("/nonexistent/adscope/categories.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CategoriesFileIo { .. }));
}

#[test]
fn load_categories_malformed_yaml_is_parse_error() {
    let path = write_temp_yaml("malformed", "categories: [label: \n");
    let err = load_categories(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ConfigError::CategoriesFileParse(_)));
}

#[test]
fn registry_from_optional_path_defaults_to_builtin() {
    let registry = CategoryRegistry::from_optional_path(None).unwrap();
    assert_eq!(registry.len(), 8);
    assert!(!registry.is_empty());
}
