use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;


#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("\"{}\" is an empty program file", .path.display())]
    Empty {
        path: PathBuf,
    },
}


pub fn load_bytecode(file_path: &Path) -> Result<Vec<u8>, LoadError> {

    let bytecode = fs::read(file_path)
        .map_err(|source| LoadError::Io { path: file_path.to_path_buf(), source })?;

    if bytecode.is_empty() {
        return Err(LoadError::Empty { path: file_path.to_path_buf() });
    }

    Ok(bytecode)
}


#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;


    #[test]
    fn reads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x01, 0x02, 0x00, 0x00, 0x00, 0x06]).unwrap();

        let bytecode = load_bytecode(file.path()).unwrap();
        assert_eq!(bytecode, vec![0x01, 0x02, 0x00, 0x00, 0x00, 0x06]);
    }


    #[test]
    fn empty_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(load_bytecode(file.path()), Err(LoadError::Empty { .. })));
    }


    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bytecode(&dir.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, LoadError::Io { ref source, .. } if source.kind() == io::ErrorKind::NotFound));
    }

}
