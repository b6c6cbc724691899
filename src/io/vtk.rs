//! Legacy VTK polydata reader
//!
//! Reads `DATASET POLYDATA` files written in ASCII or BINARY (big-endian) form.
//! Polygons and triangle strips are triangulated; point normals are kept when
//! present and every other attribute is skipped.

use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::SurfaceMesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Ascii,
    Binary,
}

/// Element type named in a section header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VtkType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl VtkType {
    fn parse(name: &str) -> Result<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "unsigned_char" | "vtktypeuint8" => VtkType::UInt8,
            "char" | "signed_char" | "vtktypeint8" => VtkType::Int8,
            "unsigned_short" | "vtktypeuint16" => VtkType::UInt16,
            "short" | "vtktypeint16" => VtkType::Int16,
            "unsigned_int" | "vtktypeuint32" => VtkType::UInt32,
            "int" | "vtkidtype" | "vtktypeint32" => VtkType::Int32,
            "unsigned_long" | "vtktypeuint64" => VtkType::UInt64,
            "long" | "vtktypeint64" => VtkType::Int64,
            "float" | "vtktypefloat32" => VtkType::Float32,
            "double" | "vtktypefloat64" => VtkType::Float64,
            other => return Err(Error::Vtk(format!("unsupported data type '{other}'"))),
        };
        Ok(ty)
    }

    fn size(self) -> usize {
        match self {
            VtkType::UInt8 | VtkType::Int8 => 1,
            VtkType::UInt16 | VtkType::Int16 => 2,
            VtkType::UInt32 | VtkType::Int32 | VtkType::Float32 => 4,
            VtkType::UInt64 | VtkType::Int64 | VtkType::Float64 => 8,
        }
    }

    fn decode(self, bytes: &[u8]) -> Vec<f64> {
        let chunks = bytes.chunks_exact(self.size());
        match self {
            VtkType::UInt8 => chunks.map(|c| c[0] as f64).collect(),
            VtkType::Int8 => chunks.map(|c| c[0] as i8 as f64).collect(),
            VtkType::UInt16 => chunks.map(|c| BigEndian::read_u16(c) as f64).collect(),
            VtkType::Int16 => chunks.map(|c| BigEndian::read_i16(c) as f64).collect(),
            VtkType::UInt32 => chunks.map(|c| BigEndian::read_u32(c) as f64).collect(),
            VtkType::Int32 => chunks.map(|c| BigEndian::read_i32(c) as f64).collect(),
            VtkType::UInt64 => chunks.map(|c| BigEndian::read_u64(c) as f64).collect(),
            VtkType::Int64 => chunks.map(|c| BigEndian::read_i64(c) as f64).collect(),
            VtkType::Float32 => chunks.map(|c| BigEndian::read_f32(c) as f64).collect(),
            VtkType::Float64 => chunks.map(BigEndian::read_f64).collect(),
        }
    }
}

/// Byte cursor that can hand out text lines, whitespace separated tokens and
/// raw binary blocks from the same buffer.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    format: DataFormat,
}

impl<'a> Reader<'a> {
    fn next_line(&mut self) -> Option<String> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[self.pos..];
        let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (len + 1).min(rest.len());
        Some(
            String::from_utf8_lossy(&rest[..len])
                .trim_end_matches('\r')
                .to_string(),
        )
    }

    /// Next line with any content, split into tokens.
    fn next_section(&mut self) -> Option<Vec<String>> {
        while let Some(line) = self.next_line() {
            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if !tokens.is_empty() {
                return Some(tokens);
            }
        }
        None
    }

    fn next_token(&mut self) -> Option<&'a [u8]> {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let bytes = self.bytes;
        let start = self.pos;
        while self.pos < bytes.len() && !bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        (self.pos > start).then(|| &bytes[start..self.pos])
    }

    /// True if the next non-blank text starts with `keyword`. Does not consume.
    fn peek_keyword(&self, keyword: &str) -> bool {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        let start = rest
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(rest.len());
        rest[start..]
            .get(..keyword.len())
            .is_some_and(|word| word.eq_ignore_ascii_case(keyword.as_bytes()))
    }

    fn read_values(&mut self, ty: VtkType, count: usize) -> Result<Vec<f64>> {
        match self.format {
            DataFormat::Ascii => (0..count)
                .map(|_| {
                    let token = self
                        .next_token()
                        .ok_or_else(|| Error::Vtk(format!("expected {count} values, ran out")))?;
                    std::str::from_utf8(token)
                        .ok()
                        .and_then(|s| s.parse::<f64>().ok())
                        .ok_or_else(|| {
                            Error::Vtk(format!(
                                "bad number '{}'",
                                String::from_utf8_lossy(token)
                            ))
                        })
                })
                .collect(),
            DataFormat::Binary => {
                let len = scaled(count, ty.size())?;
                let block = self
                    .pos
                    .checked_add(len)
                    .and_then(|end| self.bytes.get(self.pos..end))
                    .ok_or_else(|| {
                        Error::Vtk(format!("binary block of {len} bytes is truncated"))
                    })?;
                self.pos += len;
                Ok(ty.decode(block))
            }
        }
    }

    /// Discards lines up to and including the next blank one.
    fn skip_block(&mut self) {
        while let Some(line) = self.next_line() {
            if line.trim().is_empty() {
                break;
            }
        }
    }
}

/// `count * width` for a header-declared count, rejecting sizes that overflow.
fn scaled(count: usize, width: usize) -> Result<usize> {
    count
        .checked_mul(width)
        .ok_or_else(|| Error::Vtk(format!("declared count {count} is too large")))
}

fn arg<T: std::str::FromStr>(tokens: &[String], index: usize) -> Result<T> {
    tokens
        .get(index)
        .and_then(|t| t.parse::<T>().ok())
        .ok_or_else(|| Error::Vtk(format!("malformed section header '{}'", tokens.join(" "))))
}

fn type_arg(tokens: &[String], index: usize) -> Result<VtkType> {
    let name = tokens
        .get(index)
        .ok_or_else(|| Error::Vtk(format!("missing data type in '{}'", tokens.join(" "))))?;
    VtkType::parse(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Vertices,
    Lines,
    Polygons,
    Strips,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attributes {
    None,
    Point(usize),
    Cell(usize),
}

fn read_cells(reader: &mut Reader, tokens: &[String]) -> Result<Vec<Vec<usize>>> {
    let first: usize = arg(tokens, 1)?;
    let second: usize = arg(tokens, 2)?;

    let to_index = |v: f64| {
        if v >= 0.0 && v.fract() == 0.0 {
            Ok(v as usize)
        } else {
            Err(Error::Vtk(format!("bad cell index {v}")))
        }
    };

    let mut cells = Vec::new();
    if reader.peek_keyword("OFFSETS") {
        // OFFSETS/CONNECTIVITY layout: `first` offsets, `second` point ids
        let header = reader.next_section().unwrap_or_default();
        let offsets = reader.read_values(type_arg(&header, 1)?, first)?;
        let header = reader.next_section().unwrap_or_default();
        if !header
            .first()
            .is_some_and(|t| t.eq_ignore_ascii_case("CONNECTIVITY"))
        {
            return Err(Error::Vtk("OFFSETS without CONNECTIVITY".to_string()));
        }
        let connectivity = reader.read_values(type_arg(&header, 1)?, second)?;
        for window in offsets.windows(2) {
            let (start, end) = (to_index(window[0])?, to_index(window[1])?);
            let ids = connectivity
                .get(start..end)
                .ok_or_else(|| Error::Vtk(format!("cell range {start}..{end} out of bounds")))?;
            cells.push(ids.iter().map(|&v| to_index(v)).collect::<Result<Vec<_>>>()?);
        }
    } else {
        // `first` cells packed as [n, id0 .. idn-1] into `second` ints
        let packed = reader.read_values(VtkType::Int32, second)?;
        let mut i = 0;
        for _ in 0..first {
            let n = to_index(*packed.get(i).ok_or_else(|| {
                Error::Vtk("cell list shorter than its declared size".to_string())
            })?)?;
            let end = (i + 1)
                .checked_add(n)
                .ok_or_else(|| Error::Vtk(format!("cell size {n} is too large")))?;
            let ids = packed
                .get(i + 1..end)
                .ok_or_else(|| Error::Vtk("cell list shorter than its declared size".to_string()))?;
            cells.push(ids.iter().map(|&v| to_index(v)).collect::<Result<Vec<_>>>()?);
            i = end;
        }
    }
    Ok(cells)
}

/// Fan triangulation of a convex polygon.
fn triangulate_polygon(cell: &[usize], out: &mut Vec<u32>) {
    for k in 1..cell.len().saturating_sub(1) {
        out.extend([cell[0] as u32, cell[k] as u32, cell[k + 1] as u32]);
    }
}

/// Strip triangulation, flipping every other triangle to keep winding consistent.
fn triangulate_strip(cell: &[usize], out: &mut Vec<u32>) {
    for k in 0..cell.len().saturating_sub(2) {
        let (a, b, c) = (cell[k] as u32, cell[k + 1] as u32, cell[k + 2] as u32);
        if k % 2 == 0 {
            out.extend([a, b, c]);
        } else {
            out.extend([b, a, c]);
        }
    }
}

/// Skips the payload of an attribute section this reader does not use.
fn skip_attribute(
    reader: &mut Reader,
    keyword: &str,
    tokens: &[String],
    count: usize,
) -> Result<()> {
    match keyword {
        "SCALARS" => {
            let ty = type_arg(tokens, 2)?;
            let components: usize = if tokens.len() > 3 { arg(tokens, 3)? } else { 1 };
            if reader.peek_keyword("LOOKUP_TABLE") {
                reader.next_section();
            }
            reader.read_values(ty, scaled(count, components)?)?;
        }
        "COLOR_SCALARS" => {
            let components: usize = arg(tokens, 2)?;
            let ty = match reader.format {
                DataFormat::Ascii => VtkType::Float32,
                DataFormat::Binary => VtkType::UInt8,
            };
            reader.read_values(ty, scaled(count, components)?)?;
        }
        "LOOKUP_TABLE" => {
            let size: usize = arg(tokens, 2)?;
            let ty = match reader.format {
                DataFormat::Ascii => VtkType::Float32,
                DataFormat::Binary => VtkType::UInt8,
            };
            reader.read_values(ty, scaled(size, 4)?)?;
        }
        "VECTORS" | "NORMALS" => {
            reader.read_values(type_arg(tokens, 2)?, scaled(count, 3)?)?;
        }
        "TEXTURE_COORDINATES" => {
            let dim: usize = arg(tokens, 2)?;
            reader.read_values(type_arg(tokens, 3)?, scaled(count, dim)?)?;
        }
        "TENSORS" => {
            reader.read_values(type_arg(tokens, 2)?, scaled(count, 9)?)?;
        }
        "FIELD" => {
            let arrays: usize = arg(tokens, 2)?;
            for _ in 0..arrays {
                let header = reader
                    .next_section()
                    .ok_or_else(|| Error::Vtk("FIELD ended early".to_string()))?;
                let components: usize = arg(&header, 1)?;
                let tuples: usize = arg(&header, 2)?;
                reader.read_values(type_arg(&header, 3)?, scaled(components, tuples)?)?;
            }
        }
        other => return Err(Error::Vtk(format!("'{other}' is not an attribute section"))),
    }
    Ok(())
}

/// Parses a legacy VTK polydata file held in memory.
pub fn read_polydata(bytes: &[u8]) -> Result<SurfaceMesh> {
    let mut reader = Reader {
        bytes,
        pos: 0,
        format: DataFormat::Ascii,
    };

    let magic = reader.next_line().unwrap_or_default();
    if !magic.to_ascii_lowercase().starts_with("# vtk datafile") {
        return Err(Error::Vtk(format!("not a legacy VTK file: {magic:?}")));
    }
    let title = reader.next_line().unwrap_or_default();
    let format_line = reader.next_line().unwrap_or_default().trim().to_ascii_uppercase();
    reader.format = match format_line.as_str() {
        "ASCII" => DataFormat::Ascii,
        "BINARY" => DataFormat::Binary,
        other => return Err(Error::Vtk(format!("unknown file format '{other}'"))),
    };
    debug!("VTK file '{}' ({:?})", title.trim(), reader.format);

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Option<Vec<[f32; 3]>> = None;
    let mut indices: Vec<u32> = Vec::new();
    let mut cells: Vec<(CellKind, Vec<Vec<usize>>)> = Vec::new();
    let mut attributes = Attributes::None;

    while let Some(tokens) = reader.next_section() {
        let keyword = tokens[0].to_ascii_uppercase();
        match keyword.as_str() {
            "DATASET" => {
                let kind = tokens.get(1).map(|t| t.to_ascii_uppercase()).unwrap_or_default();
                if kind != "POLYDATA" {
                    return Err(Error::Vtk(format!("unsupported dataset type '{kind}'")));
                }
            }
            "POINTS" => {
                let count: usize = arg(&tokens, 1)?;
                let values = reader.read_values(type_arg(&tokens, 2)?, scaled(count, 3)?)?;
                positions = values
                    .chunks_exact(3)
                    .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
                    .collect();
            }
            "METADATA" => reader.skip_block(),
            "VERTICES" | "LINES" | "POLYGONS" | "TRIANGLE_STRIPS" => {
                let kind = match keyword.as_str() {
                    "VERTICES" => CellKind::Vertices,
                    "LINES" => CellKind::Lines,
                    "POLYGONS" => CellKind::Polygons,
                    _ => CellKind::Strips,
                };
                cells.push((kind, read_cells(&mut reader, &tokens)?));
            }
            "POINT_DATA" => attributes = Attributes::Point(arg(&tokens, 1)?),
            "CELL_DATA" => attributes = Attributes::Cell(arg(&tokens, 1)?),
            "NORMALS" if matches!(attributes, Attributes::Point(_)) => {
                let count = match attributes {
                    Attributes::Point(n) => n,
                    _ => positions.len(),
                };
                let values = reader.read_values(type_arg(&tokens, 2)?, scaled(count, 3)?)?;
                normals = Some(
                    values
                        .chunks_exact(3)
                        .map(|n| [n[0] as f32, n[1] as f32, n[2] as f32])
                        .collect(),
                );
            }
            "SCALARS" | "COLOR_SCALARS" | "LOOKUP_TABLE" | "VECTORS" | "NORMALS"
            | "TEXTURE_COORDINATES" | "TENSORS" | "FIELD" => {
                let count = match attributes {
                    Attributes::Point(n) | Attributes::Cell(n) => n,
                    Attributes::None if keyword == "FIELD" => 0,
                    Attributes::None => {
                        return Err(Error::Vtk(format!(
                            "{keyword} outside POINT_DATA/CELL_DATA"
                        )))
                    }
                };
                debug!("skipping {keyword} attribute");
                skip_attribute(&mut reader, &keyword, &tokens, count)?;
            }
            other => return Err(Error::Vtk(format!("unexpected keyword '{other}'"))),
        }
    }

    for (kind, list) in &cells {
        for cell in list {
            if let Some(&bad) = cell.iter().find(|&&id| id >= positions.len()) {
                return Err(Error::Vtk(format!(
                    "cell references point {bad}, only {} points",
                    positions.len()
                )));
            }
            match kind {
                CellKind::Polygons => triangulate_polygon(cell, &mut indices),
                CellKind::Strips => triangulate_strip(cell, &mut indices),
                CellKind::Vertices | CellKind::Lines => {}
            }
        }
    }

    Ok(SurfaceMesh::new(positions, normals, indices))
}

/// Loads one legacy VTK surface from disk.
pub fn load_surface(path: impl AsRef<Path>) -> Result<SurfaceMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::read(path, e))?;
    let mesh = read_polydata(&bytes)?;
    if mesh.is_empty() {
        warn!("{} contains no triangles", path.display());
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_ASCII: &str = "# vtk DataFile Version 3.0
unit square
ASCII
DATASET POLYDATA
POINTS 4 float
0 0 0  1 0 0  1 1 0
0 1 0
POLYGONS 1 5
4 0 1 2 3
";

    fn square_binary() -> Vec<u8> {
        let mut bytes = b"# vtk DataFile Version 3.0\nunit square\nBINARY\nDATASET POLYDATA\nPOINTS 4 float\n".to_vec();
        for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(b"\nPOLYGONS 1 5\n");
        for v in [4i32, 0, 1, 2, 3] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.push(b'\n');
        bytes
    }

    #[test]
    fn test_ascii_polygon_is_fan_triangulated() {
        let mesh = read_polydata(SQUARE_ASCII.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_binary_matches_ascii() {
        let ascii = read_polydata(SQUARE_ASCII.as_bytes()).unwrap();
        let binary = read_polydata(&square_binary()).unwrap();
        assert_eq!(ascii.positions, binary.positions);
        assert_eq!(ascii.indices, binary.indices);
    }

    #[test]
    fn test_offsets_connectivity_layout() {
        let text = "# vtk DataFile Version 5.1
vtk output
ASCII
DATASET POLYDATA
POINTS 4 float
0 0 0 1 0 0 1 1 0 0 1 0
METADATA
INFORMATION 0

POLYGONS 3 6
OFFSETS vtktypeint64
0 3 6
CONNECTIVITY vtktypeint64
0 1 2 0 2 3
";
        let mesh = read_polydata(text.as_bytes()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_triangle_strip_alternates_winding() {
        let text = "# vtk DataFile Version 3.0
strip
ASCII
DATASET POLYDATA
POINTS 5 float
0 0 0 0 1 0 1 0 0 1 1 0 2 0 0
TRIANGLE_STRIPS 1 6
5 0 1 2 3 4
";
        let mesh = read_polydata(text.as_bytes()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3, 2, 3, 4]);
    }

    #[test]
    fn test_point_normals_are_kept_and_other_attributes_skipped() {
        let text = "# vtk DataFile Version 3.0
with attributes
ASCII
DATASET POLYDATA
POINTS 3 double
0 0 0 1 0 0 0 1 0
VERTICES 1 2
1 0
LINES 1 3
2 0 1
POLYGONS 1 4
3 0 1 2
CELL_DATA 1
SCALARS label int 1
LOOKUP_TABLE default
7
POINT_DATA 3
SCALARS curvature float
LOOKUP_TABLE default
0.1 0.2 0.3
NORMALS normals float
0 0 -1 0 0 -1 0 0 -1
TEXTURE_COORDINATES uv 2 float
0 0 1 0 0 1
FIELD FieldData 1
thickness 1 3 float
1 2 3
";
        let mesh = read_polydata(text.as_bytes()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, -1.0]; 3]);
    }

    #[test]
    fn test_empty_polydata_is_accepted() {
        let text = "# vtk DataFile Version 3.0\nempty\nASCII\nDATASET POLYDATA\nPOINTS 0 float\n";
        let mesh = read_polydata(text.as_bytes()).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_rejects_bad_files() {
        assert!(matches!(read_polydata(b"solid stl\n"), Err(Error::Vtk(_))));
        let grid = "# vtk DataFile Version 3.0\ngrid\nASCII\nDATASET STRUCTURED_POINTS\n";
        assert!(matches!(read_polydata(grid.as_bytes()), Err(Error::Vtk(_))));
        let bad_index = "# vtk DataFile Version 3.0\nbad\nASCII\nDATASET POLYDATA\nPOINTS 1 float\n0 0 0\nPOLYGONS 1 4\n3 0 1 2\n";
        assert!(matches!(read_polydata(bad_index.as_bytes()), Err(Error::Vtk(_))));
    }

    #[test]
    fn test_rejects_oversized_counts() {
        let points = b"# vtk DataFile Version 3.0\nhuge\nBINARY\nDATASET POLYDATA\n\
                       POINTS 6148914691236517206 float\n\0\0\0\0";
        assert!(matches!(read_polydata(points), Err(Error::Vtk(_))));

        let normals = format!(
            "{SQUARE_ASCII}POINT_DATA {}\nNORMALS n float\n0 0 1\n",
            usize::MAX / 2
        );
        assert!(matches!(read_polydata(normals.as_bytes()), Err(Error::Vtk(_))));

        let cell = format!(
            "# vtk DataFile Version 3.0\nhuge cell\nASCII\nDATASET POLYDATA\n\
             POINTS 1 float\n0 0 0\nPOLYGONS 1 2\n{} 0\n",
            usize::MAX
        );
        assert!(matches!(read_polydata(cell.as_bytes()), Err(Error::Vtk(_))));
    }
}
