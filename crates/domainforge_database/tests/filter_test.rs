use domainforge_database::{filter_suggestions, validate_page};

#[test]
fn keeps_dots_and_hyphens() {
    let kept = filter_suggestions(&["My-Brand.co.uk".to_string()]).unwrap();
    assert_eq!(kept, vec!["my-brand.co.uk"]);
}

#[test]
fn drops_non_ascii_and_punctuation() {
    let input = vec![
        "café.com".to_string(),
        "under_score.com".to_string(),
        "ok.com".to_string(),
    ];
    assert_eq!(filter_suggestions(&input).unwrap(), vec!["ok.com"]);
}

#[test]
fn boundary_length_is_kept() {
    let exact = "a".repeat(255);
    let over = "a".repeat(256);
    assert_eq!(filter_suggestions(&[exact.clone(), over]).unwrap(), vec![exact]);
}

#[test]
fn page_bounds() {
    assert!(validate_page(1, 0).is_ok());
    assert!(validate_page(50, 100).is_ok());
    assert!(validate_page(0, 0).is_err());
    assert!(validate_page(51, 0).is_err());
    assert!(validate_page(10, -1).is_err());
}
