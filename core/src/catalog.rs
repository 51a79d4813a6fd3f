use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn default_price() -> String { "N/A".to_string() }

/// One catalog row. Only `name` and `price` are consumed by ranking; the rest
/// rides along for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_price")]
    pub price: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: impl Into<String>, category: impl Into<String>) -> Self {
        Self { name: name.into(), price: price.into(), category: category.into(), url: None, image_url: None }
    }
}

/// Read-only snapshot of catalog rows, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    pub fn empty() -> Self { Self::default() }

    pub fn products(&self) -> &[Product] { &self.products }

    pub fn len(&self) -> usize { self.products.len() }

    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    /// Load a catalog from a `.jsonl` file, a `.json` file (array or single
    /// record), a SQLite database (`.db`, `.sqlite`, `.sqlite3`) with a
    /// `products` table, or a directory of JSON/JSONL files.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() && is_sqlite(path) {
            return Self::from_sqlite(path);
        }
        let mut files: Vec<PathBuf> = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|e| unavailable(path, e))?;
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                        if matches!(ext, "json" | "jsonl") {
                            files.push(p.to_path_buf());
                        }
                    }
                }
            }
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            return Err(Error::CatalogUnavailable(format!("{} does not exist", path.display())));
        }

        let mut products = Vec::new();
        for file in files {
            if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                read_jsonl(&file, &mut products)?;
            } else {
                read_json(&file, &mut products)?;
            }
        }
        tracing::info!(path = %path.display(), num_products = products.len(), "catalog loaded");
        Ok(Self { products })
    }

    /// Read-only snapshot of the `products` table, in row order. A NULL
    /// `name` reads as `""` and a NULL `price` as `"N/A"`.
    pub fn from_sqlite<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| unavailable(path, e))?;
        let mut stmt = conn
            .prepare("SELECT name, price, category, url, image_url FROM products ORDER BY rowid")
            .map_err(|e| unavailable(path, e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Product {
                    name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    price: row.get::<_, Option<String>>(1)?.unwrap_or_else(default_price),
                    category: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    url: row.get(3)?,
                    image_url: row.get(4)?,
                })
            })
            .map_err(|e| unavailable(path, e))?;
        let products = rows.collect::<std::result::Result<Vec<_>, _>>().map_err(|e| unavailable(path, e))?;
        tracing::info!(path = %path.display(), num_products = products.len(), "catalog loaded from sqlite");
        Ok(Self { products })
    }

    /// Like [`Catalog::load`], but a missing or unreadable catalog degrades to
    /// the empty catalog instead of failing.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(path = %path.as_ref().display(), error = %err, "falling back to empty catalog");
                Self::empty()
            }
        }
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self { Self::new(products) }
}

fn is_sqlite(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("db" | "sqlite" | "sqlite3"))
}

fn unavailable(file: &Path, err: impl std::fmt::Display) -> Error {
    Error::CatalogUnavailable(format!("{}: {err}", file.display()))
}

fn read_jsonl(file: &Path, out: &mut Vec<Product>) -> Result<()> {
    let f = File::open(file).map_err(|e| unavailable(file, e))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| unavailable(file, e))?;
        if line.trim().is_empty() { continue; }
        let product: Product = serde_json::from_str(&line)
            .map_err(|e| unavailable(file, format!("line {}: {e}", lineno + 1)))?;
        out.push(product);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<Product>) -> Result<()> {
    let f = File::open(file).map_err(|e| unavailable(file, e))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f)).map_err(|e| unavailable(file, e))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v).map_err(|e| unavailable(file, e))?);
            }
        }
        serde_json::Value::Object(_) => {
            out.push(serde_json::from_value(json).map_err(|e| unavailable(file, e))?);
        }
        _ => return Err(unavailable(file, "expected an array or an object")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_fields_take_defaults() {
        let p: Product = serde_json::from_str(r#"{"category":"Cheese","url":"https://x"}"#).unwrap();
        assert_eq!(p.name, "");
        assert_eq!(p.price, "N/A");
        assert_eq!(p.url.as_deref(), Some("https://x"));
    }

    #[test]
    fn loads_directory_of_mixed_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jsonl"), "{\"name\":\"Brie\",\"price\":\"$4.99\"}\n\n{\"name\":\"Gouda\"}\n").unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"name":"Oat Milk","price":"$3.49","category":"Beverages"}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        let names: Vec<&str> = catalog.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Brie", "Gouda", "Oat Milk"]);
    }

    #[test]
    fn missing_path_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = Catalog::load(dir.path().join("nope.jsonl")).unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable(_)));
        assert!(Catalog::load_or_empty(dir.path().join("nope.jsonl")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_entry_is_unavailable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jsonl"), "{\"name\":\"Brie\"}\n").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.jsonl")).unwrap();
        assert!(matches!(Catalog::load(dir.path()), Err(Error::CatalogUnavailable(_))));
    }

    fn products_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT, price TEXT, category TEXT, url TEXT, image_url TEXT,
                scraped_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO products (name, price, category, url, image_url)
                VALUES ('Unexpected Cheddar Cheese', '$3.99', 'Cheese', 'https://shop/1', 'https://img/1');
            INSERT INTO products (name, price, category) VALUES (NULL, NULL, 'Snacks');
            INSERT INTO products (name, price, category) VALUES ('Organic Whole Milk', '$4.29', 'Beverages');",
        )
        .unwrap();
    }

    #[test]
    fn loads_products_table() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("bigbak.db");
        products_db(&db);

        let catalog = Catalog::load(&db).unwrap();
        assert_eq!(catalog.len(), 3);
        let first = &catalog.products()[0];
        assert_eq!(first.name, "Unexpected Cheddar Cheese");
        assert_eq!(first.url.as_deref(), Some("https://shop/1"));
        assert_eq!(first.image_url.as_deref(), Some("https://img/1"));
        let nulls = &catalog.products()[1];
        assert_eq!(nulls.name, "");
        assert_eq!(nulls.price, "N/A");
        assert_eq!(nulls.url, None);
        assert_eq!(catalog.products()[2].category, "Beverages");
    }

    #[test]
    fn database_without_products_table_is_unavailable() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("empty.sqlite");
        Connection::open(&db).unwrap().execute_batch("CREATE TABLE other (x INTEGER);").unwrap();
        assert!(matches!(Catalog::from_sqlite(&db), Err(Error::CatalogUnavailable(_))));
        assert!(Catalog::load_or_empty(&db).is_empty());
    }

    #[test]
    fn malformed_line_is_unavailable() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.jsonl");
        fs::write(&file, "{\"name\":\"Brie\"}\nnot json\n").unwrap();
        assert!(matches!(Catalog::load(&file), Err(Error::CatalogUnavailable(_))));
    }
}
