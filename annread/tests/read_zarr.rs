#![cfg(feature = "zarr")]

mod common;

use annread::{
    encoding_of, open_container, read, read_elem, read_partial, ArrayData, EncodingSet,
    EncodingType, Error, ReadOptions, SlotSpec, SparseFormat, Value, QC_REQUIRED_SLOTS,
};
use common::{pbmc_fixture, Fixture};
use serde_json::json;

fn dense_x() -> Vec<f64> {
    vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 4.0, 5.0, 0.0, 0.0]
}

#[test]
fn test_reads_every_slot_by_default() {
    let fx = pbmc_fixture();
    let record = read(fx.path(), &ReadOptions::default()).unwrap();

    assert_eq!(
        record.names().collect::<Vec<_>>(),
        vec!["X", "layers", "obs", "obsm", "uns", "var"]
    );
    assert!(record.diagnostics().is_empty());
    assert!(record.require(&QC_REQUIRED_SLOTS).is_ok());

    let x = record.x.as_ref().and_then(Value::as_array).unwrap();
    assert_eq!(x.shape(), &[3, 4]);
    assert_eq!(x.data(), &ArrayData::F64(dense_x()));

    let obs = record.obs.as_ref().and_then(Value::as_dataframe).unwrap();
    assert_eq!(obs.index(), &["c1", "c2", "c3"]);
    assert_eq!(
        obs.column_names().collect::<Vec<_>>(),
        vec!["n_genes", "cell_type"]
    );
    let cell_type = obs.column("cell_type").and_then(Value::as_categorical).unwrap();
    assert_eq!(cell_type.labels(), vec!["B cell", "T cell", "B cell"]);
    assert!(!cell_type.ordered);

    let var = record.var.as_ref().and_then(Value::as_dataframe).unwrap();
    assert_eq!(var.names_from("feature_name"), vec!["CD3E", "MS4A1", "NKG7", "LYZ"]);

    let obsm = record.obsm.as_ref().and_then(Value::as_mapping).unwrap();
    assert_eq!(obsm["X_pca"].shape(), Some((3, 2)));

    let layers = record.layers.as_ref().and_then(Value::as_mapping).unwrap();
    let counts = layers["counts"].as_sparse().unwrap();
    assert_eq!(counts.format(), SparseFormat::Csr);
    assert_eq!(counts.nnz(), 5);
    assert_eq!(counts.get(2, 3), Some(5.0));

    let uns = record.uns.as_ref().and_then(Value::as_mapping).unwrap();
    assert_eq!(uns["version"].as_scalar().and_then(|s| s.as_str()), Some("1.0"));

    // Directory stores stay attached even without backed access.
    assert!(record.container().is_some());
}

#[test]
fn test_missing_slot_is_null_with_one_diagnostic() {
    let fx = pbmc_fixture();
    let slots = SlotSpec::from_pairs([("X", "X"), ("spliced", "layers/spliced")]).unwrap();
    let record = read(fx.path(), &ReadOptions::new().with_slots(slots)).unwrap();

    assert!(record.x.is_some());
    assert!(record.is_null("spliced"));
    assert_eq!(record.missing(), vec!["spliced"]);
    assert_eq!(record.diagnostics().len(), 1);
    assert_eq!(
        record.diagnostics().missing_slots().collect::<Vec<_>>(),
        vec!["spliced"]
    );
    assert!(record.obs.is_none());
    assert!(!record.is_requested("obs"));
}

#[test]
fn test_custom_slot_paths_are_renamed() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new()
        .with_slot("X", "layers/counts")
        .and_then(|o| o.with_slot("pca", "/obsm/X_pca"))
        .unwrap();
    let record = read(fx.path(), &options).unwrap();

    assert_eq!(record.x.as_ref().and_then(Value::as_sparse).map(|m| m.nnz()), Some(5));
    assert_eq!(record.get("pca").and_then(Value::shape), Some((3, 2)));
    assert!(record.extra.contains_key("pca"));
}

#[test]
fn test_empty_container_short_circuits() {
    let fx = Fixture::new("empty.zarr");
    let options = ReadOptions::new().with_slot("X", "X").unwrap();
    let record = read(fx.path(), &options).unwrap();

    assert!(record.is_empty());
    assert!(record.diagnostics().is_empty());
    assert!(record.container().is_none());
}

#[test]
fn test_force_sparse_converts_dense() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new()
        .with_slot("X", "X")
        .unwrap()
        .with_force_sparse_types(EncodingType::DenseArray.into());
    let record = read(fx.path(), &options).unwrap();

    let x = record.x.as_ref().and_then(Value::as_sparse).unwrap();
    assert_eq!(x.format(), SparseFormat::Csr);
    assert_eq!(x.shape(), (3, 4));
    assert_eq!(x.nnz(), 5);
    assert_eq!(x.to_dense().unwrap().data(), &ArrayData::F64(dense_x()));
}

#[test]
fn test_unknown_force_sparse_tags_match_nothing() {
    let fx = pbmc_fixture();
    fx.group("misc", None, json!({}));
    fx.f64_array("misc/values", &[2], &[1.0, 2.0], None);

    let options = ReadOptions::new().with_force_sparse_tags("csr");
    assert!(options.force_sparse_types.is_empty());
    let record = read(fx.path(), &options).unwrap();

    let misc = record.get("misc").and_then(Value::as_mapping).unwrap();
    assert_eq!(
        misc["values"].as_array().unwrap().data(),
        &ArrayData::F64(vec![1.0, 2.0])
    );
    assert!(record.x.as_ref().and_then(Value::as_array).is_some());
}

#[cfg(feature = "serde")]
#[test]
fn test_unknown_force_sparse_tags_from_json_match_nothing() {
    let fx = pbmc_fixture();
    fx.group("misc", None, json!({}));
    fx.f64_array("misc/values", &[2], &[1.0, 2.0], None);

    let options =
        ReadOptions::from_json(r#"{"force_sparse_types": ["csr", "dense", "array"]}"#).unwrap();
    assert_eq!(
        options.force_sparse_types,
        EncodingSet::from(EncodingType::DenseArray)
    );
    let record = read(fx.path(), &options).unwrap();
    assert!(record.get("misc").and_then(Value::as_mapping).is_some());
    assert!(record.x.as_ref().and_then(Value::as_sparse).is_some());
}

#[test]
fn test_force_sparse_converts_numeric_scalar() {
    let fx = pbmc_fixture();
    fx.f64_array("n", &[1], &[3.0], Some("numeric-scalar"));
    let options = ReadOptions::new()
        .with_slot("n", "n")
        .unwrap()
        .with_force_sparse_tags("numeric-scalar");
    let record = read(fx.path(), &options).unwrap();

    let n = record.get("n").and_then(Value::as_sparse).unwrap();
    assert_eq!(n.format(), SparseFormat::Csr);
    assert_eq!(n.shape(), (1, 1));
    assert_eq!(n.get(0, 0), Some(3.0));

    let options = ReadOptions::new()
        .with_slot("version", "uns/version")
        .unwrap()
        .with_force_sparse_tags("string");
    assert!(matches!(
        read(fx.path(), &options),
        Err(Error::Conversion { .. })
    ));
}

#[test]
fn test_force_sparse_backed_wraps_in_handle() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new()
        .with_slot("X", "X")
        .unwrap()
        .with_backed(true)
        .with_force_sparse_tags("array");
    let record = read(fx.path(), &options).unwrap();

    let handle = record.x.as_ref().and_then(Value::as_handle).unwrap();
    assert!(!handle.is_backed());
    assert_eq!(handle.shape(), (3, 4));
    let row = handle.read_rows(1..2).unwrap();
    assert_eq!(row.get(0, 2), Some(3.0));
}

#[test]
fn test_backed_handle_reads_only_requested_rows() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new()
        .with_slot("X", "layers/counts")
        .unwrap()
        .with_backed(true);
    let record = read(fx.path(), &options).unwrap();

    let handle = record.x.as_ref().and_then(Value::as_handle).unwrap();
    let backed = handle.as_backed().unwrap();
    assert_eq!(backed.shape(), (3, 4));
    assert_eq!(backed.nnz(), 5);
    assert_eq!(backed.elements_read(), 0);

    let rows = handle.read_rows(1..2).unwrap();
    assert_eq!(rows.shape(), (1, 4));
    assert_eq!(rows.get(0, 0), Some(3.0));
    assert_eq!(backed.elements_read(), 1);

    let tail = backed.read_rows(2..3).unwrap();
    assert_eq!(tail.indices(), &[2, 3]);
    assert_eq!(backed.elements_read(), 3);

    let container = record.container().unwrap();
    assert!(container.is_open());
    assert!(backed.is_open());
}

#[test]
fn test_backed_takes_precedence_over_force_sparse() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new()
        .with_slot("X", "layers/counts")
        .unwrap()
        .with_backed(true)
        .with_force_sparse_types(EncodingSet::sparse());
    let record = read(fx.path(), &options).unwrap();

    let handle = record.x.as_ref().and_then(Value::as_handle).unwrap();
    assert!(handle.is_backed());
    assert_eq!(handle.as_backed().map(|b| b.elements_read()), Some(0));
}

#[test]
fn test_sparse_without_backed_loads_fully() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new().with_slot("X", "layers/counts").unwrap();
    let record = read(fx.path(), &options).unwrap();

    let x = record.x.as_ref().and_then(Value::as_sparse).unwrap();
    assert_eq!(x.indptr(), &[0, 2, 3, 5]);
    assert_eq!(x.indices(), &[1, 3, 0, 2, 3]);
    assert_eq!(x.data(), &ArrayData::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
}

#[test]
fn test_backed_csc_rows() {
    let fx = Fixture::new("csc.zarr");
    // [[1, 0],
    //  [0, 2],
    //  [3, 0]]
    fx.sparse("X", "csc_matrix", (3, 2), &[0, 2, 3], &[0, 2, 1], &[1.0, 3.0, 2.0]);
    let options = ReadOptions::new().with_backed(true);
    let record = read(fx.path(), &options).unwrap();

    let handle = record.x.as_ref().and_then(Value::as_handle).unwrap();
    assert_eq!(handle.format(), SparseFormat::Csc);
    let rows = handle.read_rows(1..3).unwrap();
    assert_eq!(rows.format(), SparseFormat::Csr);
    assert_eq!(rows.shape(), (2, 2));
    assert_eq!(rows.get(0, 1), Some(2.0));
    assert_eq!(rows.get(1, 0), Some(3.0));
}

#[test]
fn test_closed_record_invalidates_handles() {
    let fx = pbmc_fixture();
    let options = ReadOptions::new()
        .with_slot("X", "layers/counts")
        .unwrap()
        .with_backed(true);
    let mut record = read(fx.path(), &options).unwrap();
    record.close().unwrap();

    let handle = record.x.as_ref().and_then(Value::as_handle).unwrap();
    assert!(matches!(handle.read_rows(0..1), Err(Error::ContainerClosed)));
    assert!(record.container().is_none());
}

#[test]
fn test_untagged_elements_read_by_node_kind() {
    let fx = Fixture::new("untagged.zarr");
    fx.group("misc", None, json!({}));
    fx.i64_array("misc/sizes", &[3, 1, 4], None);
    let record = read(fx.path(), &ReadOptions::default()).unwrap();

    let misc = record.get("misc").and_then(Value::as_mapping).unwrap();
    let sizes = misc["sizes"].as_array().unwrap();
    assert_eq!(sizes.data(), &ArrayData::I64(vec![3, 1, 4]));
}

#[test]
fn test_nullable_column() {
    let fx = Fixture::new("nullable.zarr");
    fx.dataframe("obs", &["c1", "c2"], &["doublet"]);
    fx.group("obs/doublet", Some("nullable-boolean"), json!({}));
    fx.bool_array("obs/doublet/values", &[true, false], None);
    fx.bool_array("obs/doublet/mask", &[false, true], None);
    let record = read(fx.path(), &ReadOptions::default()).unwrap();

    let obs = record.obs.as_ref().and_then(Value::as_dataframe).unwrap();
    match obs.column("doublet") {
        Some(Value::Nullable(column)) => {
            assert_eq!(column.values, ArrayData::Bool(vec![true, false]));
            assert!(!column.is_null(0));
            assert!(column.is_null(1));
        }
        other => panic!("unexpected column {other:?}"),
    }
}

#[test]
fn test_sparse_group_without_shape_fails() {
    let fx = Fixture::new("broken.zarr");
    fx.group("X", Some("csr_matrix"), json!({}));
    fx.f32_array("X/data", &[1], &[1.0], None);
    fx.i32_array("X/indices", &[0], None);
    fx.i64_array("X/indptr", &[0, 1], None);

    let result = read(fx.path(), &ReadOptions::default());
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[test]
fn test_missing_path_fails_before_format_check() {
    let dir = tempfile::tempdir().unwrap();
    let result = read(dir.path().join("x.unknownext"), &ReadOptions::default());
    assert!(matches!(result, Err(Error::FileNotFound(_))));

    let result = read(dir.path().join("absent.zarr"), &ReadOptions::default());
    assert!(matches!(result, Err(Error::FileNotFound(_))));
}

#[test]
fn test_inspect_and_read_elem_on_open_container() {
    let fx = pbmc_fixture();
    let opened = open_container(fx.path()).unwrap();
    let container = opened.container.as_ref();

    let encoding = encoding_of(container, "obs").unwrap();
    assert_eq!(encoding.kind, EncodingType::DataFrame);
    assert_eq!(encoding.tag.as_deref(), Some("dataframe"));
    assert_eq!(encoding.version.as_deref(), Some("0.2.0"));

    let pca = read_elem(container, "obsm/X_pca").unwrap();
    let pca = pca.as_array().unwrap();
    assert_eq!(pca.shape(), &[3, 2]);
    assert_eq!(pca.data().dtype(), annread::DataType::F32);

    let record = read_partial(&opened.container, &ReadOptions::default()).unwrap();
    assert_eq!(record.len(), 6);
    // Not backed, so the caller keeps ownership of the container.
    assert!(record.container().is_none());
}
