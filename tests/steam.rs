use std::fs;

use assert_matches::assert_matches;

use maplist_generator::domain::{CollectionId, MemberId};
use maplist_generator::error::MaplistError;
use maplist_generator::steam::{
    collection_form, details_form, parse_collection_children, parse_published_file_details,
};

#[test]
fn parse_collection_fixture() {
    let raw = fs::read_to_string("tests/fixtures/collection_details.json").unwrap();
    let ids = parse_collection_children(&raw).unwrap();
    assert_eq!(
        ids,
        vec![
            MemberId::new("3070290869"),
            MemberId::new("125438255"),
            MemberId::new("3075706807"),
        ]
    );
}

#[test]
fn unknown_collection_is_malformed() {
    let raw = fs::read_to_string("tests/fixtures/collection_not_found.json").unwrap();
    let err = parse_collection_children(&raw).unwrap_err();
    assert_matches!(err, MaplistError::MalformedResponse(ref message) if message.contains("result 9"));
}

#[test]
fn missing_collection_details_is_malformed() {
    assert_matches!(
        parse_collection_children(r#"{"response": {}}"#),
        Err(MaplistError::MalformedResponse(_))
    );
    assert_matches!(
        parse_collection_children(r#"{"response": {"collectiondetails": []}}"#),
        Err(MaplistError::MalformedResponse(_))
    );
    assert_matches!(
        parse_collection_children("<html>rate limited</html>"),
        Err(MaplistError::MalformedResponse(_))
    );
}

#[test]
fn empty_children_list_is_valid() {
    let ids = parse_collection_children(
        r#"{"response": {"collectiondetails": [{"result": 1, "children": []}]}}"#,
    )
    .unwrap();
    assert!(ids.is_empty());
}

#[test]
fn parse_details_fixture_keeps_untitled_records() {
    let raw = fs::read_to_string("tests/fixtures/published_file_details.json").unwrap();
    let records = parse_published_file_details(&raw).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].title.as_deref(), Some("  Dust2  "));
    assert_eq!(records[1].title.as_deref(), Some(""));
    assert_eq!(records[2].title, None);
    assert_eq!(records[2].id.as_str(), "3075706807");
}

#[test]
fn missing_details_list_is_malformed() {
    assert_matches!(
        parse_published_file_details(r#"{"response": {"result": 1}}"#),
        Err(MaplistError::MalformedResponse(_))
    );
}

#[test]
fn collection_form_fields() {
    let id: CollectionId = "2847219313".parse().unwrap();
    let form = collection_form(&id);
    assert_eq!(
        form,
        vec![
            ("collectioncount".to_string(), "1".to_string()),
            ("publishedfileids[0]".to_string(), "2847219313".to_string()),
        ]
    );
}

#[test]
fn details_form_counts_items() {
    let ids: Vec<MemberId> = (0..50).map(|n| MemberId::new(n.to_string())).collect();
    let form = details_form(&ids);
    assert_eq!(form.len(), 51);
    assert_eq!(form[0], ("itemcount".to_string(), "50".to_string()));
    assert_eq!(
        form[50],
        ("publishedfileids[49]".to_string(), "49".to_string())
    );
}
