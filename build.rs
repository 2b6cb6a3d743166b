use std::env;

const DEFAULT_XLSX_CDN_URL: &str =
    "https://cdn.jsdelivr.net/npm/xlsx-js-style@1.2.0/dist/xlsx.bundle.js";

fn main() {
    // Spreadsheet writer CDN URL, overridable at build time
    let url = match env::var("BACKOFFICE_XLSX_CDN_URL") {
        Ok(v) if !v.trim().is_empty() => {
            println!("cargo:warning=BACKOFFICE_XLSX_CDN_URL set to {}", v);
            v
        }
        _ => DEFAULT_XLSX_CDN_URL.to_string(),
    };
    println!("cargo:rustc-env=BACKOFFICE_XLSX_CDN_URL={}", url);

    println!("cargo:rerun-if-env-changed=BACKOFFICE_XLSX_CDN_URL");
}
