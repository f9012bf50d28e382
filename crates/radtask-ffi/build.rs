use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");

    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let include_dir = crate_dir.join("include");
    std::fs::create_dir_all(&include_dir).expect("include dir should be creatable");

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("RADTASK_H")
        .with_documentation(true)
        .generate()
        .expect("radtask-ffi header generation failed")
        .write_to_file(include_dir.join("radtask.h"));
}
