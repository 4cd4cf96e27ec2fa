//! Generates Kotlin and Swift host bindings for `surrealkit-core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
