//! Archive container
//!
//! The `.dfa` frame, all integers little endian:
//!
//! * file name length (2 bytes) and the UTF-8 file name
//! * MD5 checksum of the original uncompressed bytes (16 bytes)
//! * code table length (4 bytes) and the code table as JSON text,
//!   decimal byte values quoted as strings mapped to strings of
//!   `0`/`1` characters, e.g. `{"97":"1"}`
//! * payload bit count (4 bytes) and the payload packed MSB first
//!
//! Framing only lives here, no compression logic.  Any truncated or malformed
//! field parses as a broken archive.

use bit_vec::BitVec;
use std::collections::HashMap;
use std::path::Path;
use crate::Error;
use crate::huffman::CodeTable;

pub const EXTENSION: &str = "dfa";

/// In memory form of a `.dfa` archive.
#[derive(Debug)]
pub struct Archive {
    pub filename: String,
    pub checksum: [u8;16],
    pub table: CodeTable,
    pub bit_len: u32,
    pub payload: Vec<u8>
}

impl Archive {
    /// Frame the archive as a byte sequence.
    pub fn pack(&self) -> Vec<u8> {
        let table = serialize_table(&self.table);
        let mut bytes = Vec::new();
        bytes.extend(u16::to_le_bytes(self.filename.len() as u16));
        bytes.extend(self.filename.as_bytes());
        bytes.extend(self.checksum);
        bytes.extend(u32::to_le_bytes(table.len() as u32));
        bytes.extend(&table);
        bytes.extend(u32::to_le_bytes(self.bit_len));
        bytes.extend(&self.payload);
        bytes
    }
    /// Parse an archive produced by `pack`.
    pub fn unpack(data: &[u8]) -> Result<Self,Error> {
        let mut ptr: usize = 0;
        let filename_len = read_u16(data,&mut ptr)? as usize;
        let filename = String::from_utf8(field(data,&mut ptr,filename_len)?.to_vec())
            .map_err(|_| Error::BrokenArchive)?;
        let mut checksum = [0u8;16];
        checksum.copy_from_slice(field(data,&mut ptr,16)?);
        let table_len = read_u32(data,&mut ptr)? as usize;
        let table = parse_table(field(data,&mut ptr,table_len)?)?;
        let bit_len = read_u32(data,&mut ptr)?;
        let payload = data[ptr..].to_vec();
        Ok(Self { filename, checksum, table, bit_len, payload })
    }
}

fn field<'a>(data: &'a [u8],ptr: &mut usize,len: usize) -> Result<&'a [u8],Error> {
    let end = match ptr.checked_add(len) {
        Some(end) => end,
        None => return Err(Error::BrokenArchive)
    };
    let bytes = data.get(*ptr..end).ok_or(Error::BrokenArchive)?;
    *ptr = end;
    Ok(bytes)
}

fn read_u16(data: &[u8],ptr: &mut usize) -> Result<u16,Error> {
    let bytes = field(data,ptr,2)?;
    Ok(u16::from_le_bytes([bytes[0],bytes[1]]))
}

fn read_u32(data: &[u8],ptr: &mut usize) -> Result<u32,Error> {
    let bytes = field(data,ptr,4)?;
    Ok(u32::from_le_bytes([bytes[0],bytes[1],bytes[2],bytes[3]]))
}

/// Serialize the code table as JSON text, present bytes only.
fn serialize_table(table: &CodeTable) -> Vec<u8> {
    let mut map = serde_json::Map::new();
    for (byte,code) in table.iter().enumerate() {
        if let Some(code) = code {
            let bits: String = code.iter().map(|bit| if bit { '1' } else { '0' }).collect();
            map.insert(byte.to_string(),serde_json::Value::String(bits));
        }
    }
    serde_json::Value::Object(map).to_string().into_bytes()
}

/// Parse the JSON code table back into the dense form.
fn parse_table(raw: &[u8]) -> Result<CodeTable,Error> {
    let entries: HashMap<String,String> = serde_json::from_slice(raw)
        .map_err(|_| Error::BrokenArchive)?;
    let mut table: CodeTable = vec![None;256];
    for (key,value) in entries {
        let byte: u8 = key.parse().map_err(|_| Error::BrokenArchive)?;
        if value.is_empty() {
            return Err(Error::BrokenArchive);
        }
        let mut code = BitVec::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '0' => code.push(false),
                '1' => code.push(true),
                _ => return Err(Error::BrokenArchive)
            }
        }
        table[byte as usize] = Some(code);
    }
    Ok(table)
}

/// Build the archive file name from an optional base name.  Without one the
/// archive is named after the local date, matching the historical format.
pub fn archive_name(base: Option<&str>) -> String {
    match base {
        Some(name) if !name.is_empty() => format!("{}.{}",name,EXTENSION),
        _ => format!("archived by deflate at {}.{}",chrono::Local::now().format("%Y-%m-%d"),EXTENSION)
    }
}

/// Expansion only accepts paths carrying the archive suffix.
pub fn is_archive_path(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => ext == EXTENSION,
        None => false
    }
}

// *************** TESTS *****************

#[test]
fn framing_round_trip() {
    let mut table: CodeTable = vec![None;256];
    table[97] = Some(BitVec::from_elem(1,true));
    table[98] = Some(BitVec::from_elem(2,false));
    let archive = Archive {
        filename: "notes.txt".to_string(),
        checksum: [7;16],
        table,
        bit_len: 5,
        payload: vec![0b11111000]
    };
    let packed = archive.pack();
    let unpacked = Archive::unpack(&packed).expect("unpacking failed");
    assert_eq!(unpacked.filename,"notes.txt");
    assert_eq!(unpacked.checksum,[7;16]);
    assert_eq!(unpacked.bit_len,5);
    assert_eq!(unpacked.payload,vec![0b11111000]);
    assert_eq!(unpacked.table[97],Some(BitVec::from_elem(1,true)));
    assert_eq!(unpacked.table[98],Some(BitVec::from_elem(2,false)));
    assert_eq!(unpacked.table.iter().filter(|code| code.is_some()).count(),2);
}

#[test]
fn table_wire_format() {
    let mut table: CodeTable = vec![None;256];
    table[97] = Some(BitVec::from_elem(1,true));
    assert_eq!(serialize_table(&table),br#"{"97":"1"}"#.to_vec());
    let parsed = parse_table(br#"{"97":"1"}"#).expect("parsing failed");
    assert_eq!(parsed[97],Some(BitVec::from_elem(1,true)));
}

#[test]
fn malformed_tables_are_rejected() {
    assert_eq!(parse_table(b"not json").unwrap_err(),Error::BrokenArchive);
    assert_eq!(parse_table(br#"{"300":"1"}"#).unwrap_err(),Error::BrokenArchive);
    assert_eq!(parse_table(br#"{"97":"12"}"#).unwrap_err(),Error::BrokenArchive);
    assert_eq!(parse_table(br#"{"97":""}"#).unwrap_err(),Error::BrokenArchive);
}

#[test]
fn truncated_archives_are_rejected() {
    let archive = Archive {
        filename: "notes.txt".to_string(),
        checksum: [7;16],
        table: vec![None;256],
        bit_len: 0,
        payload: vec![]
    };
    let packed = archive.pack();
    assert_eq!(Archive::unpack(&[1]).unwrap_err(),Error::BrokenArchive);
    for len in 0..packed.len() {
        assert_eq!(Archive::unpack(&packed[..len]).unwrap_err(),Error::BrokenArchive);
    }
}

#[test]
fn naming() {
    assert_eq!(archive_name(Some("backup")),"backup.dfa");
    assert!(archive_name(None).starts_with("archived by deflate at "));
    assert!(archive_name(None).ends_with(".dfa"));
    assert!(archive_name(Some("")).starts_with("archived by deflate at "));
    assert!(is_archive_path(Path::new("backup.dfa")));
    assert!(!is_archive_path(Path::new("backup.txt")));
    assert!(!is_archive_path(Path::new("dfa")));
}
