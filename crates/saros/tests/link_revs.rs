use saros::{DocDump, LoadOptions, RecordStore, Saros, SarosError};
use saros_store::{MemStore, linked_records, unlinked_records};

fn render_records(records: &[saros::DocRecord]) -> String {
    Saros::new(MemStore::from_records(records.to_vec())).render()
}

#[test]
fn reference_repository_before_and_after() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut saros = Saros::reference();
    assert_eq!(saros.render(), render_records(&unlinked_records()));
    assert!(
        saros
            .render()
            .lines()
            .any(|line| line == r#"JE00-4: name=JE00 rev=4 prev=0 last=6 content="i am JE00-4""#)
    );

    let report = saros.link_revs().expect("link");
    assert_eq!(saros.render(), render_records(&linked_records()));
    assert_eq!(saros.render().lines().count(), 20);
    assert!(report.is_clean());
}

#[test]
fn report_json_lists_every_document() {
    let mut saros = Saros::reference();
    let report = saros.link_revs().expect("link");
    let json: serde_json::Value = serde_json::from_str(&report.to_json().expect("json")).expect("parse");

    let names: Vec<&str> = json["outcomes"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|outcome| outcome["name"].as_str())
        .collect();
    assert_eq!(names, vec!["JE00", "JE01", "JE02", "JE03", "JE04"]);
    assert_eq!(json["outcomes"][0]["corrections"][1]["correction"]["last"], 8);
    assert_eq!(
        json["outcomes"][0]["corrections"][0]["cascaded"],
        serde_json::json!(["JE00-1", "JE00-2", "JE00-3"])
    );
}

#[test]
fn restore_from_dump_files_then_relink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut saros = Saros::reference();

    // Export the unlinked state, link, then restore it without cascading.
    let mut paths = Vec::new();
    for record in saros.store().records() {
        let path = dir.path().join(record.id());
        saros
            .store()
            .doc_dump(&record.name, record.rev)
            .expect("dump")
            .write_file(&path)
            .expect("write");
        paths.push(path);
    }
    saros.link_revs().expect("link");
    assert_eq!(saros.store().records(), linked_records());

    for path in &paths {
        let dump = DocDump::read_file(path).expect("read");
        saros
            .store_mut()
            .load(&dump, LoadOptions::without_cascade())
            .expect("restore");
    }
    assert_eq!(saros.store().records(), unlinked_records());

    let report = saros.link_revs().expect("relink");
    assert_eq!(report.writes(), 4);
    assert_eq!(saros.into_store().records(), linked_records());
}

#[test]
fn fail_fast_surfaces_the_first_broken_document() {
    let mut store = saros_store::saros_fixture();
    store.insert(saros::DocRecord::new("JE00", 9, 0, 12, "i am JE00-9"));
    let mut saros = Saros::new(store);

    let err = saros.link_revs().expect_err("incomplete chain");
    assert!(matches!(err, SarosError::MissingLinksAtEnd { ref name, .. } if name == "JE00"));
    assert!(err.suggestion().is_some());
    assert_eq!(saros.store().load_count(), 0);
}
