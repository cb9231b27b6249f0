//! Raster file I/O.
//!
//! TIFF files are decoded with `tiff` so GeoTIFF placement and the GDAL
//! nodata tag survive; PNG, JPEG and BMP go through `image` as luminance.
//! Only the first band of a multi-sample TIFF is read.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tracing::debug;

use super::{GeoTransform, Raster, RasterError, RasterInfo};
use crate::mosaic::PixelType;

/// Extensions read through the TIFF decoder.
const TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Extensions read through `image`.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// GeoKey directory declaring a PixelIsArea raster with no further keys.
const GEO_KEY_DIRECTORY: [u16; 8] = [1, 1, 0, 1, 1025, 0, 1, 1];

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Whether the file extension names a readable raster format.
pub fn is_supported_input(path: &Path) -> bool {
    let ext = extension(path);
    TIFF_EXTENSIONS.contains(&ext.as_str()) || IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Whether the file extension names a writable raster format (GeoTIFF).
pub fn is_supported_output(path: &Path) -> bool {
    TIFF_EXTENSIONS.contains(&extension(path).as_str())
}

/// Read a raster's header without decoding its cells.
pub fn read_info(path: &Path) -> Result<RasterInfo, RasterError> {
    let ext = extension(path);
    if TIFF_EXTENSIONS.contains(&ext.as_str()) {
        let mut decoder = open_tiff(path)?;
        tiff_info(&mut decoder)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        let (width, height) = image::image_dimensions(path)?;
        checked_info(width, height, GeoTransform::identity(), None)
    } else {
        Err(RasterError::UnsupportedFormat(ext))
    }
}

/// Read the first band of a raster.
pub fn read_raster(path: &Path) -> Result<Raster, RasterError> {
    let ext = extension(path);
    let raster = if TIFF_EXTENSIONS.contains(&ext.as_str()) {
        read_tiff(path)?
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        read_image(path)?
    } else {
        return Err(RasterError::UnsupportedFormat(ext));
    };

    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        nodata = ?raster.info().nodata,
        "Read raster"
    );
    Ok(raster)
}

fn checked_info(
    width: u32,
    height: u32,
    transform: GeoTransform,
    nodata: Option<f64>,
) -> Result<RasterInfo, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    Ok(RasterInfo {
        width,
        height,
        transform,
        nodata,
    })
}

fn open_tiff(path: &Path) -> Result<Decoder<BufReader<File>>, RasterError> {
    let file = File::open(path).map_err(|source| RasterError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = Decoder::new(BufReader::new(file))?.with_limits(Limits::unlimited());
    Ok(decoder)
}

fn tiff_info<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<RasterInfo, RasterError> {
    let (width, height) = decoder.dimensions()?;
    let transform = read_geotransform(decoder)?;
    let nodata = read_nodata(decoder)?;
    checked_info(width, height, transform, nodata)
}

fn read_geotransform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform, RasterError> {
    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)?
        .map(|value| value.into_f64_vec())
        .transpose()?;
    let tiepoint = decoder
        .find_tag(Tag::ModelTiepointTag)?
        .map(|value| value.into_f64_vec())
        .transpose()?;

    let (scale, tiepoint) = match (scale, tiepoint) {
        (Some(scale), Some(tiepoint)) => (scale, tiepoint),
        (None, None) => return Ok(GeoTransform::identity()),
        _ => {
            return Err(RasterError::InvalidGeoreference(
                "pixel scale and tiepoint must be given together".to_string(),
            ))
        }
    };

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(RasterError::InvalidGeoreference(format!(
            "expected 3 scale and 6 tiepoint values, found {} and {}",
            scale.len(),
            tiepoint.len()
        )));
    }
    if !scale[..2].iter().chain(&tiepoint[..5]).all(|v| v.is_finite()) {
        return Err(RasterError::InvalidGeoreference(format!(
            "non-finite pixel scale {:?} or tiepoint {:?}",
            &scale[..2],
            &tiepoint[..5]
        )));
    }
    let (cell_width, cell_height) = (scale[0], scale[1]);
    if !(cell_width > 0.0 && cell_height > 0.0) {
        return Err(RasterError::InvalidGeoreference(format!(
            "cell size must be positive, found {} x {}",
            cell_width, cell_height
        )));
    }

    // Tiepoint (i, j, k, x, y, z) ties raster cell (i, j) to map (x, y).
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Ok(GeoTransform::new(
        x - i * cell_width,
        y + j * cell_height,
        cell_width,
        cell_height,
    ))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>, RasterError> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    let text = text.trim_matches(char::from(0)).trim();
    Ok(text.parse::<f64>().ok())
}

fn read_tiff(path: &Path) -> Result<Raster, RasterError> {
    let mut decoder = open_tiff(path)?;
    let info = tiff_info(&mut decoder)?;
    let samples = samples_to_f64(decoder.read_image()?)?;
    let data = first_band(samples, info.cell_count())?;
    Ok(Raster::from_parts(info, data))
}

fn read_image(path: &Path) -> Result<Raster, RasterError> {
    let img = image::open(path)?;
    let info = checked_info(img.width(), img.height(), GeoTransform::identity(), None)?;

    let color = img.color();
    let bytes_per_channel = color.bytes_per_pixel() / color.channel_count().max(1);
    let data: Vec<f64> = if bytes_per_channel > 1 {
        img.to_luma16().into_raw().into_iter().map(f64::from).collect()
    } else {
        img.to_luma8().into_raw().into_iter().map(f64::from).collect()
    };
    Ok(Raster::from_parts(info, data))
}

#[allow(unreachable_patterns)]
fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>, RasterError> {
    let samples = match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        _ => {
            return Err(RasterError::UnsupportedLayout(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };
    Ok(samples)
}

/// Keep the first sample of each interleaved pixel.
fn first_band(samples: Vec<f64>, cells: usize) -> Result<Vec<f64>, RasterError> {
    if cells == 0 || samples.len() % cells != 0 || samples.is_empty() {
        return Err(RasterError::UnsupportedLayout(format!(
            "{} samples do not fill {} cells",
            samples.len(),
            cells
        )));
    }
    let per_pixel = samples.len() / cells;
    if per_pixel == 1 {
        return Ok(samples);
    }
    Ok(samples.into_iter().step_by(per_pixel).collect())
}

/// Write a raster as a single-band GeoTIFF of the given pixel type.
///
/// Values are quantized to the pixel type; cells with no data become the
/// type's nodata value, which is also recorded in the GDAL nodata tag.
pub fn write_geotiff(path: &Path, raster: &Raster, pixel_type: PixelType) -> Result<(), RasterError> {
    let file = File::create(path).map_err(|source| RasterError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;

    match pixel_type {
        PixelType::Unsigned8 => {
            write_band::<colortype::Gray8, _>(&mut encoder, raster, pixel_type, |v| v as u8)
        }
        PixelType::Signed8 => {
            write_band::<colortype::GrayI8, _>(&mut encoder, raster, pixel_type, |v| v as i8)
        }
        PixelType::Unsigned16 => {
            write_band::<colortype::Gray16, _>(&mut encoder, raster, pixel_type, |v| v as u16)
        }
        PixelType::Signed16 => {
            write_band::<colortype::GrayI16, _>(&mut encoder, raster, pixel_type, |v| v as i16)
        }
        PixelType::Unsigned32 => {
            write_band::<colortype::Gray32, _>(&mut encoder, raster, pixel_type, |v| v as u32)
        }
        PixelType::Signed32 => {
            write_band::<colortype::GrayI32, _>(&mut encoder, raster, pixel_type, |v| v as i32)
        }
        PixelType::Float32 => {
            write_band::<colortype::Gray32Float, _>(&mut encoder, raster, pixel_type, |v| v as f32)
        }
        PixelType::Float64 => {
            write_band::<colortype::Gray64Float, _>(&mut encoder, raster, pixel_type, |v| v)
        }
    }?;

    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        pixel_type = %pixel_type,
        "Wrote GeoTIFF"
    );
    Ok(())
}

fn write_band<C, W>(
    encoder: &mut TiffEncoder<W>,
    raster: &Raster,
    pixel_type: PixelType,
    convert: impl Fn(f64) -> C::Inner,
) -> Result<(), RasterError>
where
    C: ColorType,
    [C::Inner]: TiffValue,
    W: Write + Seek,
{
    let transform = raster.transform();
    let mut image = encoder.new_image::<C>(raster.width(), raster.height())?;

    image.encoder().write_tag(
        Tag::ModelPixelScaleTag,
        &[transform.cell_width, transform.cell_height, 0.0][..],
    )?;
    image.encoder().write_tag(
        Tag::ModelTiepointTag,
        &[0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0][..],
    )?;
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &GEO_KEY_DIRECTORY[..])?;
    image
        .encoder()
        .write_tag(Tag::GdalNodata, nodata_text(pixel_type).as_str())?;

    let nodata = raster.info().nodata;
    let samples: Vec<C::Inner> = raster
        .data()
        .iter()
        .map(|&v| {
            let v = if nodata == Some(v) { f64::NAN } else { v };
            convert(pixel_type.quantize(v))
        })
        .collect();
    image.write_data(&samples)?;
    Ok(())
}

fn nodata_text(pixel_type: PixelType) -> String {
    let nodata = pixel_type.nodata();
    if nodata.is_nan() {
        "nan".to_string()
    } else {
        format!("{}", nodata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Raster {
        Raster::new(
            3,
            2,
            GeoTransform::new(500_000.0, 4_100_000.0, 30.0, 30.0),
            vec![1.0, 2.0, 3.0, 4.0, f64::NAN, 6.0],
        )
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_input(Path::new("a.tif")));
        assert!(is_supported_input(Path::new("a.TIFF")));
        assert!(is_supported_input(Path::new("a.png")));
        assert!(!is_supported_input(Path::new("a.shp")));
        assert!(!is_supported_input(Path::new("noext")));

        assert!(is_supported_output(Path::new("out.tif")));
        assert!(!is_supported_output(Path::new("out.png")));
    }

    #[test]
    fn test_geotiff_float_preserves_values_and_placement() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("float.tif");
        write_geotiff(&path, &sample(), PixelType::Float32).unwrap();

        let raster = read_raster(&path).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(
            *raster.transform(),
            GeoTransform::new(500_000.0, 4_100_000.0, 30.0, 30.0)
        );
        assert_eq!(raster.value(0, 0), Some(1.0));
        assert_eq!(raster.value(2, 1), Some(6.0));
        assert_eq!(raster.value(1, 1), None);
        assert!(raster.info().nodata.unwrap().is_nan());
    }

    #[test]
    fn test_geotiff_integer_uses_type_nodata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("byte.tif");
        write_geotiff(&path, &sample(), PixelType::Unsigned8).unwrap();

        let raster = read_raster(&path).unwrap();
        assert_eq!(raster.info().nodata, Some(255.0));
        assert_eq!(raster.data()[4], 255.0);
        assert_eq!(raster.value(1, 1), None);
        assert_eq!(raster.value(1, 0), Some(2.0));
    }

    #[test]
    fn test_read_info_matches_raster() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("info.tif");
        write_geotiff(&path, &sample(), PixelType::Signed16).unwrap();

        let info = read_info(&path).unwrap();
        assert_eq!(info.width, 3);
        assert_eq!(info.height, 2);
        assert_eq!(info.nodata, Some(i16::MIN as f64));
    }

    #[test]
    fn test_non_finite_tiepoint_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nan.tif");
        let raster = Raster::new(
            2,
            2,
            GeoTransform::new(f64::NAN, 2.0, 1.0, 1.0),
            vec![1.0; 4],
        );
        write_geotiff(&path, &raster, PixelType::Float32).unwrap();

        assert!(matches!(
            read_info(&path),
            Err(RasterError::InvalidGeoreference(_))
        ));
        assert!(matches!(
            read_raster(&path),
            Err(RasterError::InvalidGeoreference(_))
        ));
    }

    #[test]
    fn test_read_png_as_luminance() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gray.png");
        let img = image::GrayImage::from_raw(2, 2, vec![0, 64, 128, 255]).unwrap();
        img.save(&path).unwrap();

        let raster = read_raster(&path).unwrap();
        assert_eq!(raster.data(), &[0.0, 64.0, 128.0, 255.0]);
        assert_eq!(*raster.transform(), GeoTransform::identity());
        assert_eq!(read_info(&path).unwrap().width, 2);
    }

    #[test]
    fn test_missing_file() {
        let result = read_raster(Path::new("/nonexistent/missing.tif"));
        assert!(matches!(result, Err(RasterError::Open { .. })));
    }

    #[test]
    fn test_unsupported_format() {
        let result = read_raster(Path::new("roads.shp"));
        assert!(matches!(result, Err(RasterError::UnsupportedFormat(ext)) if ext == "shp"));
    }

    #[test]
    fn test_first_band_of_interleaved_samples() {
        let band = first_band(vec![1.0, 9.0, 2.0, 9.0], 2).unwrap();
        assert_eq!(band, vec![1.0, 2.0]);
        assert!(first_band(vec![1.0, 2.0, 3.0], 2).is_err());
    }
}
