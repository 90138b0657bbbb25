use ndarray::Array2;
use roi_volume::{
    catalog::{RoiCatalog, RoiList},
    crop::{CropOptions, VolumeCropper},
    enums::BitDepth,
    roi::{Rect, Region, plane_label},
    volume::Calibration,
    volume_fraction::{ThresholdBand, VolumeFractionEstimator},
    volume_loader::VolumeLoader,
    voxel_fraction::VoxelVolumeFraction,
};

type DemoError = Box<dyn std::error::Error>;

const CUBE: usize = 100;
const PADDING: usize = 5;

fn main() -> Result<(), DemoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Solid cube centred in a background volume
    let side = CUBE + 2 * PADDING;
    let inside = PADDING..PADDING + CUBE;
    let planes: Vec<Array2<u16>> = (0..side)
        .map(|z| {
            Array2::from_shape_fn((side, side), |(y, x)| {
                if inside.contains(&z) && inside.contains(&y) && inside.contains(&x) {
                    255
                } else {
                    0
                }
            })
        })
        .collect();
    let calibration = Calibration::default();
    let volume = VolumeLoader::load_from_planes(&planes, BitDepth::Eight, calibration.clone())?;

    let estimator = VoxelVolumeFraction::new(ThresholdBand::new(127, 255));
    let whole = estimator.estimate(&volume, None)?;
    for row in whole.to_rows("whole volume", &calibration) {
        tracing::info!("{}: {} = {}", row.label, row.metric, row.value);
    }

    let mut catalog = RoiList::new();
    let middle = side / 2;
    catalog.add(Region::from_name(
        plane_label(middle, middle as i32, middle as i32),
        Rect::new(0, 0, side as i32, side as i32),
    ));
    let single_plane = estimator.estimate(&volume, Some(&catalog))?;
    for row in single_plane.to_rows("middle plane", &calibration) {
        tracing::info!("{}: {} = {}", row.label, row.metric, row.value);
    }

    let options = CropOptions {
        fill_background: true,
        fill_value: 0,
        padding: 2,
    };
    match VolumeCropper::crop(&volume, &catalog, &options) {
        Some(cropped) => tracing::info!(
            "Cropped {} region(s) to {:?} (depth, height, width)",
            catalog.count(),
            cropped.dim()
        ),
        None => tracing::warn!("No region overlaps the volume"),
    }

    Ok(())
}
