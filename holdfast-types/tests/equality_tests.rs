use holdfast_types::{
    Comparison, FieldDiff, InstanceId, Persistent, StructuralEq, check_equality,
    compare_identity, first_mismatch,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Crop {
    name: String,
    level: u32,
}

impl StructuralEq for Crop {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        cmp.field("name", &self.name, &other.name);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Plot {
    instance_id: InstanceId,
    position: (i32, i32),
    crop: Option<Crop>,
    rows: Vec<Crop>,
    marks: Vec<(i32, i32)>,
}

impl Plot {
    fn at(id: &str, x: i32, y: i32) -> Self {
        Self {
            instance_id: InstanceId::new(id),
            position: (x, y),
            ..Default::default()
        }
    }
}

impl StructuralEq for Plot {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        compare_identity(self, other, cmp);
        cmp.field("position", &self.position, &other.position)
            .optional_record("crop", self.crop.as_ref(), other.crop.as_ref())
            .sequence("rows", &self.rows, &other.rows)
            .values("marks", &self.marks, &other.marks);
    }
}

impl Persistent for Plot {
    const COLLECTION: &'static str = "Plot";

    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }
}

fn crop(name: &str) -> Crop {
    Crop {
        name: name.into(),
        level: 1,
    }
}

// ── check_equal ───────────────────────────────────────────────────

#[test]
fn identical_records_are_equal() {
    let a = Plot::at("p1", 0, 0);
    assert!(a.check_equal(&a.clone()));
    assert!(a.diff(&a.clone()).is_empty());
}

#[test]
fn different_ids_are_unequal() {
    let a = Plot::at("p1", 0, 0);
    let b = Plot::at("p2", 0, 0);
    assert!(!a.check_equal(&b));
}

#[test]
fn ignored_fields_do_not_count() {
    let mut a = Plot::at("p1", 0, 0);
    let mut b = a.clone();
    a.crop = Some(Crop { name: "rose".into(), level: 1 });
    b.crop = Some(Crop { name: "rose".into(), level: 9 });
    assert!(a.check_equal(&b));
}

#[test]
fn first_mismatch_mode_stops_early() {
    let a = Plot::at("p1", 0, 0);
    let b = Plot::at("p2", 5, 5);
    let mut cmp = Comparison::first_mismatch();
    a.compare_fields(&b, &mut cmp);
    assert!(cmp.is_settled());
    assert_eq!(cmp.into_diffs().len(), 1);
}

// ── diff ──────────────────────────────────────────────────────────

#[test]
fn diff_reports_every_field() {
    let mut a = Plot::at("p1", 0, 0);
    let mut b = Plot::at("p2", 1, 0);
    a.crop = Some(crop("rose"));
    b.crop = Some(crop("tulip"));

    let diffs = a.diff(&b);
    let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(fields, vec!["instance_id", "position", "crop.name"]);
}

#[test]
fn diff_reports_both_values() {
    let a = Plot::at("p1", 0, 0);
    let b = Plot::at("p1", 3, 4);
    assert_eq!(
        a.diff(&b),
        vec![FieldDiff {
            field: "position".into(),
            left: "(0, 0)".into(),
            right: "(3, 4)".into(),
        }]
    );
}

#[test]
fn diff_reports_missing_sub_record() {
    let mut a = Plot::at("p1", 0, 0);
    let b = a.clone();
    a.crop = Some(crop("rose"));
    let diffs = a.diff(&b);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].field, "crop");
    assert_eq!(diffs[0].right, "None");
}

#[test]
fn diff_reports_sequence_index() {
    let mut a = Plot::at("p1", 0, 0);
    let mut b = a.clone();
    a.rows = vec![crop("rose"), crop("lily")];
    b.rows = vec![crop("rose"), crop("iris")];
    let diffs = a.diff(&b);
    assert_eq!(diffs[0].field, "rows[1].name");
}

#[test]
fn diff_reports_sequence_length() {
    let mut a = Plot::at("p1", 0, 0);
    let b = a.clone();
    a.marks = vec![(1, 1)];
    let diffs = a.diff(&b);
    assert_eq!(diffs[0].field, "marks.len");
    assert_eq!(diffs[0].left, "1");
    assert_eq!(diffs[0].right, "0");
}

#[test]
fn diff_reports_value_index() {
    let mut a = Plot::at("p1", 0, 0);
    let mut b = a.clone();
    a.marks = vec![(0, 0), (1, 0), (2, 0)];
    b.marks = vec![(0, 0), (1, 1), (2, 0)];
    let diffs = a.diff(&b);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].field, "marks[1]");
}

// ── check_equality ────────────────────────────────────────────────

#[test]
fn equality_of_matching_lists() {
    let a = vec![Plot::at("a", 0, 0), Plot::at("b", 1, 0)];
    let b = a.clone();
    assert!(check_equality(&a, &b));
    assert_eq!(first_mismatch(&a, &b), None);
}

#[test]
fn equality_fails_on_length() {
    let a = vec![Plot::at("a", 0, 0), Plot::at("b", 1, 0), Plot::at("c", 2, 0)];
    let b = vec![Plot::at("a", 0, 0), Plot::at("b", 1, 0)];
    assert!(!check_equality(&a, &b));
    assert_eq!(first_mismatch(&a, &b), Some(2));
}

#[test]
fn equality_fails_on_single_index() {
    let a = vec![Plot::at("a", 0, 0), Plot::at("b", 1, 0), Plot::at("c", 2, 0)];
    let mut b = a.clone();
    b[1].position = (1, 1);
    assert!(!check_equality(&a, &b));
    assert_eq!(first_mismatch(&a, &b), Some(1));
}

#[test]
fn empty_lists_are_equal() {
    let a: Vec<Plot> = Vec::new();
    assert!(check_equality(&a, &a));
}

// ── Persistent ────────────────────────────────────────────────────

#[test]
fn key_uses_collection_and_id() {
    let p = Plot::at("p9", 0, 0);
    let key = p.key();
    assert_eq!(key.collection, "Plot");
    assert_eq!(key.instance_id.as_str(), "p9");
}

#[test]
fn default_hooks() {
    let mut p = Plot::default();
    assert!(p.should_sync_remote());
    p.prepare_for_save();
    assert!(p.instance_id().is_singleton());
}
