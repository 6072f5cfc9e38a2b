// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL ingestion (binary and ASCII).
//!
//! Produces an ordered triangle list; facet normals are discarded since
//! slicing only needs vertex positions.

use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::many0,
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::mesh::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Detect the STL flavour and parse it into a [`Mesh`].
///
/// Files starting with `solid` are treated as ASCII unless the binary
/// triangle count in the header matches the file length exactly (some
/// exporters write `solid` into binary headers).
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return parse_ascii_stl(data);
    }
    if data.starts_with(b"solid") && binary_len(data) != Some(data.len()) {
        return parse_ascii_stl(data);
    }
    parse_binary_stl(data)
}

fn declared_count(data: &[u8]) -> usize {
    u32::from_le_bytes([
        data[HEADER_LEN],
        data[HEADER_LEN + 1],
        data[HEADER_LEN + 2],
        data[HEADER_LEN + 3],
    ]) as usize
}

fn binary_len(data: &[u8]) -> Option<usize> {
    declared_count(data)
        .checked_mul(FACET_LEN)
        .and_then(|n| n.checked_add(HEADER_LEN + 4))
}

fn read_f32_le(data: &[u8], offset: usize) -> f64 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]) as f64
}

fn read_point(data: &[u8], offset: usize) -> Point3<f64> {
    Point3::new(
        read_f32_le(data, offset),
        read_f32_le(data, offset + 4),
        read_f32_le(data, offset + 8),
    )
}

fn parse_binary_stl(data: &[u8]) -> Result<Mesh> {
    let count = declared_count(data);
    let expected = binary_len(data).unwrap_or(usize::MAX);
    if data.len() < expected {
        return Err(Error::TruncatedBinary {
            expected,
            actual: data.len(),
        });
    }

    let mut triangles = Vec::with_capacity(count);
    for i in 0..count {
        // skip the 12-byte normal
        let base = HEADER_LEN + 4 + i * FACET_LEN + 12;
        triangles.push(Triangle::new(
            read_point(data, base),
            read_point(data, base + 12),
            read_point(data, base + 24),
        ));
    }

    if triangles.is_empty() {
        return Err(Error::Empty);
    }
    tracing::debug!(triangles = triangles.len(), "Parsed binary STL");
    Ok(Mesh::new(triangles))
}

fn parse_ascii_stl(data: &[u8]) -> Result<Mesh> {
    let text = std::str::from_utf8(data)?;
    let triangles = match solid(text) {
        Ok((_, triangles)) => triangles,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(Error::MalformedAscii(e.input.chars().take(40).collect()));
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(Error::MalformedAscii(String::new()));
        }
    };

    if triangles.is_empty() {
        return Err(Error::Empty);
    }
    tracing::debug!(triangles = triangles.len(), "Parsed ASCII STL");
    Ok(Mesh::new(triangles))
}

/// Keyword preceded by optional whitespace
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(word))
}

fn coord(input: &str) -> IResult<&str, f64> {
    preceded(multispace1, double)(input)
}

/// `vertex x y z`
fn vertex(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = keyword("vertex")(input)?;
    let (input, (x, y, z)) = tuple((coord, coord, coord))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// `facet normal .. outer loop <3 vertices> endloop endfacet`
fn facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = keyword("facet")(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, _) = keyword("outer")(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (a, b, c)) = tuple((vertex, vertex, vertex))(input)?;
    let (input, _) = keyword("endloop")(input)?;
    let (input, _) = keyword("endfacet")(input)?;
    Ok((input, Triangle::new(a, b, c)))
}

fn solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = keyword("solid")(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, triangles) = many0(facet)(input)?;
    let (input, _) = opt(keyword("endsolid"))(input)?;
    Ok((input, triangles))
}
