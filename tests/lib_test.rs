//! Library integration tests.

use fsloader::{LoaderError, VERSION};

#[test]
fn error_types_are_public() {
    let err = LoaderError::TemplateNotFound {
        name: "test".into(),
    };
    assert!(err.to_string().contains("test"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> fsloader::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn version_matches_package() {
    assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!VERSION.is_empty());
}

#[test]
fn backends_are_public() {
    use fsloader::fs::{Filesystem, MemoryFs, MultiFs};
    use std::sync::Arc;

    let mut chain = MultiFs::new();
    chain.add_fs("memory", Arc::new(MemoryFs::new()));
    assert!(!chain.is_file("anything.tpl").unwrap());
}
