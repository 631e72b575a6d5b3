use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubcastError {
    #[error("{kind} file not found: '{}'", path.display())]
    InputNotFound { kind: &'static str, path: PathBuf },

    #[error("block {block}, line {line}: expected a cue number, found '{found}'")]
    MalformedIndex {
        block: usize,
        line: usize,
        found: String,
    },

    #[error(
        "block {block}, line {line}: expected 'HH:MM:SS,mmm --> HH:MM:SS,mmm', found '{found}'"
    )]
    MalformedTimestamp {
        block: usize,
        line: usize,
        found: String,
    },

    #[error("failed to write '{}'", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failure_names_path_once_and_keeps_cause() {
        let err = SubcastError::WriteFailure {
            path: PathBuf::from("out/page.html"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        };

        assert_eq!(err.to_string(), "failed to write 'out/page.html'");
        assert_eq!(
            format!("{:#}", anyhow::Error::new(err)),
            "failed to write 'out/page.html': no such directory"
        );
    }
}
