//! Capability checks on real files.
//!
//! Tests verify:
//! - The built-in resolver picks the specialized reader for well-formed headers
//! - Malformed or foreign content falls through to the next candidate
//! - Truncated headers are recorded as failed checks, not fatal errors
//! - In-memory arrays route to the array reader

use bioimage_resolver::error::IoError;
use bioimage_resolver::{
    ArrayLike, Attempt, DependencyAdvisor, FormatRegistry, InputDescriptor, InstallGroup,
    ReaderKind, ReaderSet, ResolveError, Resolver, Route, SkipReason,
};

use super::test_utils::{
    create_bigtiff, create_garbage, create_ome_tiff, create_plain_tiff, TempFile,
};

fn resolver() -> Resolver {
    Resolver::builtin().unwrap()
}

async fn open(file: &TempFile) -> InputDescriptor {
    InputDescriptor::open(file.path()).await.unwrap()
}

// =============================================================================
// TIFF Family
// =============================================================================

#[tokio::test]
async fn test_ome_tiff_file() {
    let file = TempFile::new("cells.ome.tif", &create_ome_tiff());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::OmeTiff);
    assert!(resolution.skipped.is_empty());
    assert_eq!(
        resolution.untried,
        vec![ReaderKind::Tiff, ReaderKind::Bioformats, ReaderKind::Default]
    );
}

#[tokio::test]
async fn test_ome_xml_in_plain_tif_name() {
    // The OME check looks at content, not the compound suffix
    let file = TempFile::new("cells.tif", &create_ome_tiff());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::OmeTiff);
}

#[tokio::test]
async fn test_plain_tiff_skips_ome_reader() {
    let file = TempFile::new("slide.TIF", &create_plain_tiff());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Tiff);
    assert_eq!(resolution.skipped, vec![Attempt::rejected(ReaderKind::OmeTiff)]);
}

#[tokio::test]
async fn test_bigtiff() {
    let file = TempFile::new("large.tiff", &create_bigtiff());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Tiff);
    assert_eq!(resolution.route.to_string(), "tiff");
}

#[tokio::test]
async fn test_truncated_ifd_is_a_failed_check() {
    let mut data = b"II*\0".to_vec();
    data.extend_from_slice(&8u32.to_le_bytes());
    // Five entries declared, none present
    data.extend_from_slice(&5u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 4]);
    let file = TempFile::new("truncated.tif", &data);

    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Tiff);
    assert_eq!(resolution.skipped.len(), 1);
    assert_eq!(resolution.skipped[0].reader, ReaderKind::OmeTiff);
    assert!(matches!(
        resolution.skipped[0].reason,
        SkipReason::CapabilityCheckFailed { .. }
    ));
}

#[cfg(feature = "base-imageio")]
#[tokio::test]
async fn test_garbage_tif_exhausts_candidates() {
    let advisor = DependencyAdvisor::builtin().with_unavailable(InstallGroup::Bioformats);
    let resolver = Resolver::new(
        FormatRegistry::builtin().unwrap().clone(),
        ReaderSet::builtin(),
        advisor,
    );
    let file = TempFile::new("broken.tif", &create_garbage(256));

    let err = resolver.resolve(&open(&file).await).await.unwrap_err();

    match &err {
        ResolveError::NoReaderAccepted { attempted, .. } => {
            let readers: Vec<_> = attempted.iter().map(|a| a.reader).collect();
            assert_eq!(
                readers,
                vec![
                    ReaderKind::OmeTiff,
                    ReaderKind::Tiff,
                    ReaderKind::Bioformats,
                    ReaderKind::Default
                ]
            );
            assert_eq!(attempted[2].install_group(), Some(InstallGroup::Bioformats));
            assert_eq!(attempted[3].reason, SkipReason::Rejected);
        }
        other => panic!("Expected NoReaderAccepted, got {other:?}"),
    }
    assert_eq!(err.install_groups(), vec![InstallGroup::Bioformats]);
}

// =============================================================================
// Container Formats
// =============================================================================

#[cfg(feature = "czi")]
#[tokio::test]
async fn test_czi_file() {
    let file = TempFile::new("plate.czi", &super::test_utils::create_czi());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Czi);
    assert!(resolution.skipped.is_empty());
}

#[cfg(all(feature = "czi", feature = "bioformats"))]
#[tokio::test]
async fn test_foreign_czi_falls_back_to_bioformats() {
    let file = TempFile::new("plate.czi", &create_garbage(128));
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Bioformats);
    assert_eq!(resolution.skipped, vec![Attempt::rejected(ReaderKind::Czi)]);
}

#[cfg(feature = "lif")]
#[tokio::test]
async fn test_lif_file() {
    let file = TempFile::new("stack.lif", &super::test_utils::create_lif());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Lif);
}

#[cfg(feature = "base-imageio")]
#[tokio::test]
async fn test_jpeg_file() {
    let file = TempFile::new("photo.jpeg", &super::test_utils::create_jpeg());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Default);
    assert_eq!(resolution.untried, vec![ReaderKind::Bioformats]);
}

#[cfg(feature = "base-imageio")]
#[tokio::test]
async fn test_extensionless_jpeg() {
    let file = TempFile::new("snapshot", &super::test_utils::create_jpeg());
    let resolution = resolver().resolve(&open(&file).await).await.unwrap();

    assert_eq!(resolution.route, Route::NoExtension);
    assert_eq!(resolution.reader, ReaderKind::Default);
}

// =============================================================================
// Inputs
// =============================================================================

#[tokio::test]
async fn test_array_like_input() {
    let resolver = resolver();

    let array = ArrayLike::new(vec![4, 4], 2, vec![0u8; 32]);
    let resolution = resolver
        .resolve(&InputDescriptor::array_like(array))
        .await
        .unwrap();
    assert_eq!(resolution.reader, ReaderKind::ArrayLike);
    assert_eq!(resolution.route, Route::ArrayLike);

    let inconsistent = ArrayLike::new(vec![4, 4], 2, vec![0u8; 31]);
    let err = resolver
        .resolve(&InputDescriptor::array_like(inconsistent))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NoReaderAccepted { ref extension, .. } if extension == "array-like"));
}

#[tokio::test]
async fn test_open_missing_file() {
    let err = InputDescriptor::open("/nonexistent/dir/sample.ome.tif")
        .await
        .unwrap_err();
    assert!(matches!(err, IoError::NotFound(_)));
}
