#![allow(dead_code)]

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value as Json};
use tempfile::TempDir;
use zarrs::array::chunk_grid::ChunkGrid;
use zarrs::array::{ArrayBuilder, DataType, Element, FillValue};
use zarrs::filesystem::FilesystemStore;
use zarrs::group::GroupBuilder;
use zarrs::storage::ReadableWritableListableStorage;

/// Directory store written with the same layout AnnData uses
pub struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    store: ReadableWritableListableStorage,
}

fn key(path: &str) -> String {
    format!("/{path}")
}

fn chunk_grid(shape: &[u64]) -> ChunkGrid {
    let chunks: Vec<NonZeroU64> = shape
        .iter()
        .map(|&s| NonZeroU64::new(s.max(1)).unwrap())
        .collect();
    ChunkGrid::from(chunks)
}

fn encoding_attrs(encoding: Option<&str>, extra: Json) -> Map<String, Json> {
    let mut attrs = match extra {
        Json::Object(map) => map,
        _ => Map::new(),
    };
    if let Some(tag) = encoding {
        attrs.insert("encoding-type".into(), json!(tag));
        attrs.insert("encoding-version".into(), json!("0.2.0"));
    }
    attrs
}

impl Fixture {
    /// Empty store with a tagged root group
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(name);
        std::fs::create_dir_all(&root).unwrap();
        let store: ReadableWritableListableStorage =
            Arc::new(FilesystemStore::new(&root).unwrap());
        let fixture = Fixture {
            _dir: dir,
            root,
            store,
        };
        fixture.group("", Some("anndata"), json!({}));
        fixture
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn group(&self, path: &str, encoding: Option<&str>, extra: Json) -> &Self {
        let group = GroupBuilder::new()
            .attributes(encoding_attrs(encoding, extra))
            .build(self.store.clone(), &key(path))
            .unwrap();
        group.store_metadata().unwrap();
        self
    }

    fn array<T: Element>(
        &self,
        path: &str,
        shape: &[u64],
        dtype: DataType,
        fill: FillValue,
        data: &[T],
        encoding: Option<&str>,
    ) -> &Self {
        let array = ArrayBuilder::new(shape.to_vec(), dtype, chunk_grid(shape), fill)
            .attributes(encoding_attrs(encoding, json!({})))
            .build(self.store.clone(), &key(path))
            .unwrap();
        array.store_metadata().unwrap();
        // Empty arrays have no chunks to write.
        if shape.iter().product::<u64>() > 0 {
            array
                .store_array_subset_elements::<T>(&array.subset_all(), data)
                .unwrap();
        }
        self
    }

    pub fn f64_array(
        &self,
        path: &str,
        shape: &[u64],
        data: &[f64],
        encoding: Option<&str>,
    ) -> &Self {
        let fill = FillValue::from(0.0f64);
        self.array(path, shape, DataType::Float64, fill, data, encoding)
    }

    pub fn f32_array(
        &self,
        path: &str,
        shape: &[u64],
        data: &[f32],
        encoding: Option<&str>,
    ) -> &Self {
        let fill = FillValue::from(0.0f32);
        self.array(path, shape, DataType::Float32, fill, data, encoding)
    }

    pub fn i64_array(&self, path: &str, data: &[i64], encoding: Option<&str>) -> &Self {
        let shape = [data.len() as u64];
        self.array(path, &shape, DataType::Int64, FillValue::from(0i64), data, encoding)
    }

    pub fn i32_array(&self, path: &str, data: &[i32], encoding: Option<&str>) -> &Self {
        let shape = [data.len() as u64];
        self.array(path, &shape, DataType::Int32, FillValue::from(0i32), data, encoding)
    }

    pub fn bool_array(&self, path: &str, data: &[bool], encoding: Option<&str>) -> &Self {
        let shape = [data.len() as u64];
        self.array(path, &shape, DataType::Bool, FillValue::from(false), data, encoding)
    }

    pub fn str_array(&self, path: &str, data: &[&str], encoding: Option<&str>) -> &Self {
        let shape = [data.len() as u64];
        let values: Vec<String> = data.iter().map(|s| s.to_string()).collect();
        self.array(path, &shape, DataType::String, FillValue::from(""), values.as_slice(), encoding)
    }

    /// Compressed sparse group with `f32` values
    pub fn sparse(
        &self,
        path: &str,
        encoding: &str,
        shape: (u64, u64),
        indptr: &[i64],
        indices: &[i32],
        data: &[f32],
    ) -> &Self {
        self.group(path, Some(encoding), json!({ "shape": [shape.0, shape.1] }));
        self.f32_array(&format!("{path}/data"), &[data.len() as u64], data, None);
        self.i32_array(&format!("{path}/indices"), indices, None);
        self.i64_array(&format!("{path}/indptr"), indptr, None);
        self
    }

    /// Table with a string index and the given column order
    pub fn dataframe(&self, path: &str, index: &[&str], column_order: &[&str]) -> &Self {
        self.group(
            path,
            Some("dataframe"),
            json!({ "_index": "_index", "column-order": column_order }),
        );
        self.str_array(&format!("{path}/_index"), index, Some("string-array"));
        self
    }

    pub fn categorical(&self, path: &str, codes: &[i32], categories: &[&str]) -> &Self {
        self.group(path, Some("categorical"), json!({ "ordered": false }));
        self.i32_array(&format!("{path}/codes"), codes, Some("array"));
        self.str_array(&format!("{path}/categories"), categories, Some("string-array"));
        self
    }
}

/// Small AnnData-shaped store used across the read tests
///
/// `X` is dense:
/// ```text
/// [[1, 0, 0, 2],
///  [0, 0, 3, 0],
///  [4, 5, 0, 0]]
/// ```
/// `layers/counts` is CSR:
/// ```text
/// [[0, 1, 0, 2],
///  [3, 0, 0, 0],
///  [0, 0, 4, 5]]
/// ```
pub fn pbmc_fixture() -> Fixture {
    let fx = Fixture::new("pbmc.zarr");
    fx.f64_array(
        "X",
        &[3, 4],
        &[1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 4.0, 5.0, 0.0, 0.0],
        Some("array"),
    );

    fx.dataframe("obs", &["c1", "c2", "c3"], &["n_genes", "cell_type"]);
    fx.i64_array("obs/n_genes", &[120, 98, 143], Some("array"));
    fx.categorical("obs/cell_type", &[0, 1, 0], &["B cell", "T cell"]);

    fx.dataframe("var", &["ENSG01", "ENSG02", "ENSG03", "ENSG04"], &["feature_name"]);
    fx.str_array(
        "var/feature_name",
        &["CD3E", "MS4A1", "NKG7", "LYZ"],
        Some("string-array"),
    );

    fx.group("obsm", Some("dict"), json!({}));
    fx.f32_array("obsm/X_pca", &[3, 2], &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], Some("array"));

    fx.group("layers", Some("dict"), json!({}));
    fx.sparse(
        "layers/counts",
        "csr_matrix",
        (3, 4),
        &[0, 2, 3, 5],
        &[1, 3, 0, 2, 3],
        &[1.0, 2.0, 3.0, 4.0, 5.0],
    );

    fx.group("uns", Some("dict"), json!({}));
    fx.str_array("uns/version", &["1.0"], Some("string"));
    fx
}
