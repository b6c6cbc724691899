//! NRRD volume reader
//!
//! Supports attached (`.nrrd`) and detached (`.nhdr` + `data file`) headers with
//! `raw`, `gzip` and `ascii` encodings and every fixed-size scalar type. Samples
//! are converted to `f32` on load.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::MultiGzDecoder;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::volume::Volume;

/// Sample type of the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ScalarType {
    /// Parses any of the spellings the NRRD format allows for a type.
    pub fn from_nrrd(name: &str) -> Option<Self> {
        let ty = match name.trim() {
            "signed char" | "int8" | "int8_t" => ScalarType::Int8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => ScalarType::UInt8,
            "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
                ScalarType::Int16
            }
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
                ScalarType::UInt16
            }
            "int" | "signed int" | "int32" | "int32_t" => ScalarType::Int32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => ScalarType::UInt32,
            "longlong" | "long long" | "long long int" | "signed long long"
            | "signed long long int" | "int64" | "int64_t" => ScalarType::Int64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => ScalarType::UInt64,
            "float" => ScalarType::Float32,
            "double" => ScalarType::Float64,
            _ => return None,
        };
        Some(ty)
    }

    pub fn size(self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::UInt8 => 1,
            ScalarType::Int16 | ScalarType::UInt16 => 2,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float32 => 4,
            ScalarType::Int64 | ScalarType::UInt64 | ScalarType::Float64 => 8,
        }
    }

    fn decode<B: ByteOrder>(self, bytes: &[u8]) -> Vec<f32> {
        let chunks = bytes.chunks_exact(self.size());
        match self {
            ScalarType::Int8 => chunks.map(|c| c[0] as i8 as f32).collect(),
            ScalarType::UInt8 => chunks.map(|c| c[0] as f32).collect(),
            ScalarType::Int16 => chunks.map(|c| B::read_i16(c) as f32).collect(),
            ScalarType::UInt16 => chunks.map(|c| B::read_u16(c) as f32).collect(),
            ScalarType::Int32 => chunks.map(|c| B::read_i32(c) as f32).collect(),
            ScalarType::UInt32 => chunks.map(|c| B::read_u32(c) as f32).collect(),
            ScalarType::Int64 => chunks.map(|c| B::read_i64(c) as f32).collect(),
            ScalarType::UInt64 => chunks.map(|c| B::read_u64(c) as f32).collect(),
            ScalarType::Float32 => chunks.map(B::read_f32).collect(),
            ScalarType::Float64 => chunks.map(|c| B::read_f64(c) as f32).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raw,
    Gzip,
    Ascii,
}

impl Encoding {
    fn from_nrrd(name: &str) -> Option<Self> {
        match name.trim() {
            "raw" => Some(Encoding::Raw),
            "gzip" | "gz" => Some(Encoding::Gzip),
            "ascii" | "text" | "txt" => Some(Encoding::Ascii),
            _ => None,
        }
    }
}

/// Parsed NRRD header
#[derive(Debug, Clone)]
pub struct NrrdHeader {
    pub version: u32,
    pub scalar_type: ScalarType,
    pub sizes: Vec<usize>,
    pub endian: Endian,
    pub encoding: Encoding,
    pub spacings: Option<Vec<f64>>,
    pub space_directions: Option<Vec<Option<Vec<f64>>>>,
    pub space_origin: Option<Vec<f64>>,
    pub data_file: Option<String>,
    pub byte_skip: i64,
    pub line_skip: usize,
    /// `key:=value` pairs, kept verbatim
    pub key_values: BTreeMap<String, String>,
}

impl NrrdHeader {
    /// Parses the header at the start of `bytes`.
    ///
    /// Returns the header and the offset of the first payload byte (the end of
    /// `bytes` when the header has no blank-line terminator).
    pub fn parse(bytes: &[u8]) -> Result<(NrrdHeader, usize)> {
        let mut offset = 0;
        let mut lines = Vec::new();
        let mut terminated = false;
        while offset < bytes.len() {
            let end = bytes[offset..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |p| offset + p);
            let line = String::from_utf8_lossy(&bytes[offset..end])
                .trim_end_matches('\r')
                .to_string();
            offset = (end + 1).min(bytes.len());
            if line.is_empty() && !lines.is_empty() {
                terminated = true;
                break;
            }
            lines.push(line);
        }
        if !terminated {
            offset = bytes.len();
        }

        let mut lines = lines.into_iter();
        let magic = lines.next().unwrap_or_default();
        let version = magic
            .strip_prefix("NRRD")
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| Error::Nrrd(format!("bad magic line {magic:?}")))?;

        let mut fields: BTreeMap<String, String> = BTreeMap::new();
        let mut key_values = BTreeMap::new();
        for line in lines {
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once(":=") {
                key_values.insert(key.to_string(), value.to_string());
            } else if let Some((key, value)) = line.split_once(": ") {
                fields.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            } else {
                return Err(Error::Nrrd(format!("malformed header line {line:?}")));
            }
        }

        let required = |name: &str| {
            fields
                .get(name)
                .ok_or_else(|| Error::Nrrd(format!("missing required field '{name}'")))
        };

        let type_name = required("type")?;
        let scalar_type = ScalarType::from_nrrd(type_name)
            .ok_or_else(|| Error::Nrrd(format!("unsupported type '{type_name}'")))?;

        let dimension: usize = parse_number(required("dimension")?, "dimension")?;
        let sizes = required("sizes")?
            .split_whitespace()
            .map(|s| parse_number::<usize>(s, "sizes"))
            .collect::<Result<Vec<_>>>()?;
        if sizes.len() != dimension {
            return Err(Error::Nrrd(format!(
                "dimension is {dimension} but {} sizes were given",
                sizes.len()
            )));
        }

        let encoding_name = required("encoding")?;
        let encoding = Encoding::from_nrrd(encoding_name)
            .ok_or_else(|| Error::Nrrd(format!("unsupported encoding '{encoding_name}'")))?;

        let endian = match fields.get("endian").map(String::as_str) {
            Some("big") => Endian::Big,
            Some("little") | None => Endian::Little,
            Some(other) => return Err(Error::Nrrd(format!("unknown endian '{other}'"))),
        };

        let spacings = fields
            .get("spacings")
            .map(|value| {
                value
                    .split_whitespace()
                    .map(|s| parse_number::<f64>(s, "spacings"))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let space_directions = fields
            .get("space directions")
            .map(|value| parse_vector_list(value))
            .transpose()?;

        let space_origin = match fields.get("space origin") {
            Some(value) => match parse_vector_list(value)?.into_iter().next() {
                Some(Some(origin)) => Some(origin),
                _ => return Err(Error::Nrrd(format!("bad space origin '{value}'"))),
            },
            None => None,
        };

        let data_file = fields
            .get("data file")
            .or_else(|| fields.get("datafile"))
            .cloned();

        let byte_skip = fields
            .get("byte skip")
            .map(|s| parse_number::<i64>(s, "byte skip"))
            .transpose()?
            .unwrap_or(0);
        let line_skip = fields
            .get("line skip")
            .map(|s| parse_number::<usize>(s, "line skip"))
            .transpose()?
            .unwrap_or(0);

        Ok((
            NrrdHeader {
                version,
                scalar_type,
                sizes,
                endian,
                encoding,
                spacings,
                space_directions,
                space_origin,
                data_file,
                byte_skip,
                line_skip,
                key_values,
            },
            offset,
        ))
    }

    /// Grid dimensions as (nx, ny, nz); 2-D images become a single slice.
    pub fn grid_dims(&self) -> Result<[usize; 3]> {
        match self.sizes.as_slice() {
            &[nx, ny, nz] => Ok([nx, ny, nz]),
            &[nx, ny] => Ok([nx, ny, 1]),
            other => Err(Error::Nrrd(format!(
                "expected a 2-D or 3-D image, got {} axes",
                other.len()
            ))),
        }
    }

    /// Number of samples the sizes describe; fails when the product overflows.
    pub fn sample_count(&self) -> Result<usize> {
        self.sizes
            .iter()
            .try_fold(1usize, |count, &size| count.checked_mul(size))
            .ok_or_else(|| Error::Nrrd(format!("sizes {:?} are too large", self.sizes)))
    }

    /// Voxel spacing per axis, from `spacings` or the norms of `space directions`.
    pub fn grid_spacing(&self) -> [f32; 3] {
        let mut spacing = [1.0f32; 3];
        if let Some(spacings) = &self.spacings {
            for (out, &s) in spacing.iter_mut().zip(spacings) {
                if s.is_finite() && s != 0.0 {
                    *out = s.abs() as f32;
                }
            }
        } else if let Some(directions) = &self.space_directions {
            let spatial = directions.iter().filter_map(|d| d.as_ref());
            for (out, direction) in spacing.iter_mut().zip(spatial) {
                let norm = direction.iter().map(|c| c * c).sum::<f64>().sqrt();
                if norm > 0.0 {
                    *out = norm as f32;
                }
            }
        }
        spacing
    }

    pub fn grid_origin(&self) -> [f32; 3] {
        let mut origin = [0.0f32; 3];
        if let Some(space_origin) = &self.space_origin {
            for (out, &o) in origin.iter_mut().zip(space_origin) {
                *out = o as f32;
            }
        }
        origin
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| Error::Nrrd(format!("bad value '{value}' for '{field}'")))
}

/// Parses `(1,0,0) none (0, 1, 0)` style vector lists.
fn parse_vector_list(value: &str) -> Result<Vec<Option<Vec<f64>>>> {
    let mut vectors = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("none") {
            vectors.push(None);
            rest = after.trim_start();
        } else if let Some(after) = rest.strip_prefix('(') {
            let close = after
                .find(')')
                .ok_or_else(|| Error::Nrrd(format!("unterminated vector in '{value}'")))?;
            let components = after[..close]
                .split(',')
                .map(|c| parse_number::<f64>(c, "vector"))
                .collect::<Result<Vec<_>>>()?;
            vectors.push(Some(components));
            rest = after[close + 1..].trim_start();
        } else {
            return Err(Error::Nrrd(format!("bad vector list '{value}'")));
        }
    }
    Ok(vectors)
}

/// Decodes the payload described by `header` into samples.
pub fn decode_payload(header: &NrrdHeader, payload: &[u8]) -> Result<Vec<f32>> {
    let payload = skip_lines(payload, header.line_skip);
    let count = header.sample_count()?;

    let bytes = match header.encoding {
        Encoding::Ascii => return decode_ascii(payload, count),
        Encoding::Raw => payload.to_vec(),
        Encoding::Gzip => {
            let mut decoded = Vec::new();
            MultiGzDecoder::new(payload)
                .read_to_end(&mut decoded)
                .map_err(|e| Error::Nrrd(format!("gzip payload: {e}")))?;
            decoded
        }
    };

    let expected = count
        .checked_mul(header.scalar_type.size())
        .ok_or_else(|| Error::Nrrd(format!("{count} samples do not fit in memory")))?;
    let start = if header.byte_skip == -1 {
        if header.encoding != Encoding::Raw {
            return Err(Error::Nrrd("byte skip -1 requires raw encoding".to_string()));
        }
        bytes.len().checked_sub(expected).ok_or_else(|| {
            Error::Nrrd(format!("payload has {} bytes, expected {expected}", bytes.len()))
        })?
    } else {
        usize::try_from(header.byte_skip)
            .map_err(|_| Error::Nrrd(format!("bad byte skip {}", header.byte_skip)))?
    };

    let data = start
        .checked_add(expected)
        .and_then(|end| bytes.get(start..end))
        .ok_or_else(|| {
            Error::Nrrd(format!(
                "payload has {} bytes after skipping {start}, expected {expected}",
                bytes.len().saturating_sub(start)
            ))
        })?;

    Ok(match header.endian {
        Endian::Little => header.scalar_type.decode::<LittleEndian>(data),
        Endian::Big => header.scalar_type.decode::<BigEndian>(data),
    })
}

fn skip_lines(bytes: &[u8], lines: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..lines {
        match rest.iter().position(|&b| b == b'\n') {
            Some(p) => rest = &rest[p + 1..],
            None => return &[],
        }
    }
    rest
}

fn decode_ascii(bytes: &[u8], count: usize) -> Result<Vec<f32>> {
    let text = String::from_utf8_lossy(bytes);
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .take(count)
        .map(|s| parse_number::<f32>(s, "ascii sample"))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != count {
        return Err(Error::Nrrd(format!(
            "ascii payload has {} samples, expected {count}",
            values.len()
        )));
    }
    Ok(values)
}

/// Builds a volume from an in-memory NRRD file.
///
/// `base_dir` resolves a detached `data file`; it is required for detached headers.
pub fn read_volume(bytes: &[u8], base_dir: Option<&Path>) -> Result<Volume> {
    let (header, offset) = NrrdHeader::parse(bytes)?;
    debug!(
        "NRRD{:04} header: type {:?}, sizes {:?}, encoding {:?}, endian {:?}",
        header.version, header.scalar_type, header.sizes, header.encoding, header.endian
    );
    for (key, value) in &header.key_values {
        debug!("NRRD key/value {key} := {value}");
    }

    let samples = match &header.data_file {
        Some(name) => {
            if name.split_whitespace().count() > 1 || name == "LIST" {
                return Err(Error::Nrrd(format!(
                    "multi-file data '{name}' is not supported"
                )));
            }
            let base = base_dir.ok_or_else(|| {
                Error::Nrrd("detached header needs the directory of its data file".to_string())
            })?;
            let data_path: PathBuf = base.join(name);
            let payload =
                std::fs::read(&data_path).map_err(|e| Error::read(&data_path, e))?;
            decode_payload(&header, &payload)?
        }
        None => decode_payload(&header, &bytes[offset..])?,
    };

    let dims = header.grid_dims()?;
    let volume = Volume::new(dims, samples)
        .ok_or_else(|| Error::Nrrd(format!("sample count does not match sizes {dims:?}")))?
        .with_spacing(header.grid_spacing())
        .with_origin(header.grid_origin());
    Ok(volume)
}

/// Loads an NRRD scan from disk and logs its extent.
pub fn load_volume(path: impl AsRef<Path>) -> Result<Volume> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::read(path, e))?;
    let volume = read_volume(&bytes, path.parent())?;
    info!("Raw data extent: {}", volume.extent());
    Ok(volume)
}
