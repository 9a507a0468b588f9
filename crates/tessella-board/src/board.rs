//! Pixel board state
//!
//! This module owns the authoritative in-memory grid: a flat row-major RGBA
//! buffer of fixed dimensions, created once at startup and mutated in place.
//! Alpha is not independently settable; every stored alpha byte is 255.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A validated RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// White, the default board fill
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create a color from channel values
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parse a `"r,g,b"` triplet as sent by the reset endpoint
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<i64>());
        let (r, g, b) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => (r, g, b),
            _ => {
                return Err(Error::InvalidColor {
                    r: -1,
                    g: -1,
                    b: -1,
                })
            }
        };
        channels_to_rgb(r, g, b)
    }
}

/// A single-pixel mutation request as received from a client.
///
/// Channels and coordinates are decoded as wide integers so range errors are
/// reported as validation failures rather than deserialization noise;
/// non-integer JSON values still fail to decode (malformed body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacePixelRequest {
    /// Target column
    pub x: i64,
    /// Target row
    pub y: i64,
    /// Requested color
    pub color: ColorInput,
}

/// Unvalidated color channels from a mutation request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColorInput {
    /// Red channel
    pub r: i64,
    /// Green channel
    pub g: i64,
    /// Blue channel
    pub b: i64,
}

/// A validated mutation, safe to apply
#[derive(Debug, Clone, Copy)]
pub struct PixelChange {
    /// Target column, within board width
    pub x: u32,
    /// Target row, within board height
    pub y: u32,
    /// Color to write
    pub color: Rgb,
}

fn channels_to_rgb(r: i64, g: i64, b: i64) -> Result<Rgb> {
    let range = 0..=255;
    if !range.contains(&r) || !range.contains(&g) || !range.contains(&b) {
        return Err(Error::InvalidColor { r, g, b });
    }
    Ok(Rgb::new(r as u8, g as u8, b as u8))
}

/// The shared pixel grid
#[derive(Debug, Clone)]
pub struct PixelBoard {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBoard {
    /// Create a board with every pixel set to the given color
    #[must_use]
    pub fn blank(width: u32, height: u32, fill: Rgb) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&[fill.r, fill.g, fill.b, 255]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Reconstruct a board from a raw RGBA buffer (e.g. loaded from storage).
    ///
    /// The buffer must hold exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(Error::IncompleteStore {
                expected: (expected / 4) as u64,
                found: (data.len() / 4) as u64,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Board width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Row-major pixel position `x + y * width`, the persistence key basis
    #[must_use]
    pub fn linear_index(&self, x: u32, y: u32) -> u64 {
        u64::from(x) + u64::from(y) * u64::from(self.width)
    }

    /// Check coordinates and channels, producing an applicable change
    pub fn validate(&self, req: &PlacePixelRequest) -> Result<PixelChange> {
        if req.x < 0 || req.y < 0 || req.x >= i64::from(self.width) || req.y >= i64::from(self.height)
        {
            return Err(Error::OutOfBounds { x: req.x, y: req.y });
        }
        let color = channels_to_rgb(req.color.r, req.color.g, req.color.b)?;
        Ok(PixelChange {
            x: req.x as u32,
            y: req.y as u32,
            color,
        })
    }

    /// Write a validated change into the buffer.
    ///
    /// Pure in-memory effect; broadcast and persistence are orchestrated by
    /// the caller.
    pub fn apply(&mut self, change: &PixelChange) {
        let offset = self.byte_offset(change.x, change.y);
        self.data[offset] = change.color.r;
        self.data[offset + 1] = change.color.g;
        self.data[offset + 2] = change.color.b;
        self.data[offset + 3] = 255;
    }

    /// Overwrite every pixel's RGB channels, leaving alpha bytes as-is
    pub fn full_reset(&mut self, color: Rgb) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel[0] = color.r;
            pixel[1] = color.g;
            pixel[2] = color.b;
        }
    }

    /// Current buffer contents, for transmission to viewers
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn byte_offset(&self, x: u32, y: u32) -> usize {
        ((self.width as usize) * (y as usize) + (x as usize)) * 4
    }
}
