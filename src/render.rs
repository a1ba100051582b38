use crate::cache::CacheDir;
use crate::engine::Document;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Points per inch in PDF user space; a zoom of 1.0 renders at this dpi.
pub const BASE_DPI: u32 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The configured default dpi, stored as `page_NNN.png`.
    Default,
    /// An explicit dpi, stored as `page_NNN_{dpi}dpi.png`.
    Dpi(u32),
}

/// Artifact file name for a 1-based page number.
pub fn artifact_name(page_number: u32, resolution: Resolution) -> String {
    match resolution {
        Resolution::Default => format!("page_{page_number:03}.png"),
        Resolution::Dpi(dpi) => format!("page_{page_number:03}_{dpi}dpi.png"),
    }
}

pub fn zoom_for(dpi: u32) -> f32 {
    dpi as f32 / BASE_DPI as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-based page number.
    pub page: u32,
    pub path: PathBuf,
    pub dpi: u32,
    /// `None` only when a cached artifact's header could not be read.
    pub dimensions: Option<Dimensions>,
    /// True when the artifact already existed and nothing was rasterized.
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    default_dpi: u32,
}

impl Renderer {
    pub fn new(default_dpi: u32) -> Self {
        Self { default_dpi }
    }

    pub fn dpi_of(&self, resolution: Resolution) -> u32 {
        match resolution {
            Resolution::Default => self.default_dpi,
            Resolution::Dpi(dpi) => dpi,
        }
    }

    /// Renders page `index` (0-based) into `cache`, unless an artifact for
    /// the same page and resolution already exists. Existing artifacts are
    /// never overwritten.
    pub fn render<D: Document + ?Sized>(
        &self,
        doc: &D,
        index: u32,
        cache: &CacheDir,
        resolution: Resolution,
    ) -> Result<RenderedPage> {
        let page = index + 1;
        let dpi = self.dpi_of(resolution);
        let path = cache.join(&artifact_name(page, resolution));

        if path.exists() {
            debug!("cache hit {}", path.display());
            return Ok(cached_page(page, path, dpi));
        }

        let raster = doc.rasterize(index, zoom_for(dpi))?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                debug!("artifact appeared while rendering {}", path.display());
                return Ok(cached_page(page, path, dpi));
            }
            Err(source) => {
                return Err(Error::Io {
                    context: format!("create {}", path.display()),
                    source,
                });
            }
        };
        if let Err(source) = file.write_all(&raster.png) {
            // A truncated artifact would be served forever.
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(Error::Io {
                context: format!("write {}", path.display()),
                source,
            });
        }

        info!(
            "rendered page {} at {}dpi ({}x{}) -> {}",
            page,
            dpi,
            raster.width,
            raster.height,
            path.display()
        );

        Ok(RenderedPage {
            page,
            path,
            dpi,
            dimensions: Some(Dimensions {
                width: raster.width,
                height: raster.height,
            }),
            cached: false,
        })
    }
}

fn cached_page(page: u32, path: PathBuf, dpi: u32) -> RenderedPage {
    let dimensions = match image::image_dimensions(&path) {
        Ok((width, height)) => Some(Dimensions { width, height }),
        Err(err) => {
            warn!("cannot read dimensions of {}: {err}", path.display());
            None
        }
    };
    RenderedPage {
        page,
        path,
        dpi,
        dimensions,
        cached: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_are_zero_padded() {
        assert_eq!(artifact_name(7, Resolution::Default), "page_007.png");
        assert_eq!(artifact_name(7, Resolution::Dpi(300)), "page_007_300dpi.png");
        assert_eq!(artifact_name(1234, Resolution::Default), "page_1234.png");
    }

    #[test]
    fn zoom_is_relative_to_72_dpi() {
        assert_eq!(zoom_for(72), 1.0);
        assert_eq!(zoom_for(144), 2.0);
        assert!((zoom_for(150) - 2.0833333).abs() < 1e-5);
    }
}
