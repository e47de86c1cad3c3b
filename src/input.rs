//! File handles for plain and gzip-compressed inputs and outputs.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use tempfile::NamedTempFile;

use crate::error::Error;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "gz")
}

/// Opens a file for buffered reading, decompressing it when the name ends in `.gz`.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

enum Sink {
    Plain(BufWriter<NamedTempFile>),
    Gzip(GzEncoder<BufWriter<NamedTempFile>>),
}

/// Buffered output, gzip-compressed when the name ends in `.gz`.
///
/// Data goes to a temporary file next to the destination, which only appears
/// under its final name after [`Output::finish`]. Dropping an unfinished output
/// removes the temporary file.
pub struct Output {
    sink: Sink,
    path: PathBuf,
}

impl Output {
    /// Flushes buffered data, writes the gzip trailer if needed and moves the
    /// file into place.
    pub fn finish(self) -> Result<(), Error> {
        let buffered = match self.sink {
            Sink::Plain(writer) => writer,
            Sink::Gzip(encoder) => encoder.finish()?,
        };
        let temp = buffered.into_inner().map_err(io::IntoInnerError::into_error)?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.sink {
            Sink::Plain(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Plain(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
        }
    }
}

pub fn create_output(path: &Path) -> Result<Output, Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let writer = BufWriter::new(NamedTempFile::new_in(dir)?);
    let sink = if is_gzip(path) {
        Sink::Gzip(GzEncoder::new(writer, Compression::default()))
    } else {
        Sink::Plain(writer)
    };
    Ok(Output {
        sink,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn plain_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.embl");
        let mut out = create_output(&path).unwrap();
        out.write_all(b"ID   x;\n//\n").unwrap();
        out.finish().unwrap();

        let mut content = String::new();
        open_input(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "ID   x;\n//\n");
    }

    #[test]
    fn gzip_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.embl.gz");
        let mut out = create_output(&path).unwrap();
        out.write_all(b"ID   x;\n//\n").unwrap();
        out.finish().unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let mut content = String::new();
        open_input(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "ID   x;\n//\n");
    }

    #[test]
    fn unfinished_output_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.embl");
        let mut out = create_output(&path).unwrap();
        out.write_all(b"ID   x;\n").unwrap();
        assert!(!path.exists());
        drop(out);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_input_is_io_error() {
        let err = open_input(Path::new("/nonexistent/in.embl")).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }
}
