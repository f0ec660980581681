//! # Deflate Library
//!
//! Compress or expand files with a DEFLATE style two stage pipeline
//! * `lz77` replaces repeated byte runs with `(offset,length,literal)` codewords over a sliding window
//! * `huffman` entropy codes the serialized codewords with a static prefix tree
//! * `archive` frames the stages together with the original file name and an MD5 checksum
//! * `lz77_huff` glues everything into the `.dfa` archive codec
//!
//! This is a lookalike of DEFLATE, the bit stream is not interoperable with RFC 1951.
//! The compression/expansion functions transform buffers (we expect files that are
//! easily buffered).
//!
//! ## Buffer Example
//!
//! ```rs
//! use deflate::lz77_huff;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let archive = lz77_huff::compress(test_data,"chaunt.txt");
//! let (filename,restored) = lz77_huff::expand(&archive).expect("expansion failed");
//! assert_eq!(restored,test_data);
//! ```

pub mod lz77;
pub mod huffman;
pub mod archive;
pub mod lz77_huff;

/// Archive Errors
#[derive(thiserror::Error,Debug,PartialEq,Eq)]
pub enum Error {
    #[error("file extension is not .dfa")]
    NotArchive,
    #[error("can not decode data")]
    BrokenArchive,
    #[error("wrong checksum")]
    WrongChecksum,
    #[error("codeword not in window, file can not be decompressed")]
    OutOfWindow,
    #[error("codeword offset negative, file can not be decompressed")]
    NegativeOffset
}
