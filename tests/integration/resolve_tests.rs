//! Resolver integration tests.
//!
//! Tests verify:
//! - First-accepting candidate wins and earlier candidates are recorded
//! - Unavailable readers are never asked to check an input
//! - Unknown extensions, exhausted lists and missing dependencies are distinct errors
//! - Resolution is idempotent and case-insensitive
//! - Timeouts and check failures only skip the affected candidate

use std::sync::Arc;
use std::time::Duration;

use bioimage_resolver::{
    Attempt, DependencyAdvisor, FormatRegistry, InputDescriptor, InstallGroup, ReaderKind,
    ReaderSet, ResolveError, Resolver, Route, SkipReason,
};

use super::test_utils::{MockAnswer, MockReader, TrackingReader};

fn builtin_registry() -> FormatRegistry {
    FormatRegistry::builtin().unwrap().clone()
}

fn resolver_with(readers: &[&MockReader], advisor: DependencyAdvisor) -> Resolver {
    let set = readers
        .iter()
        .fold(ReaderSet::empty(), |set, reader| set.with((*reader).clone()));
    Resolver::new(builtin_registry(), set, advisor)
}

fn input(name: &str) -> InputDescriptor {
    InputDescriptor::from_bytes(name, vec![0u8; 64])
}

// =============================================================================
// Fallback Chain
// =============================================================================

#[tokio::test]
async fn test_czi_accepted_by_specialized_reader() {
    let czi = MockReader::accepting(ReaderKind::Czi);
    let bioformats = MockReader::accepting(ReaderKind::Bioformats);
    let resolver = resolver_with(&[&czi, &bioformats], DependencyAdvisor::empty());

    let resolution = resolver.resolve(&input("img.czi")).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Czi);
    assert!(resolution.skipped.is_empty());
    assert_eq!(resolution.untried, vec![ReaderKind::Bioformats]);
    assert_eq!(bioformats.call_count(), 0);
}

#[tokio::test]
async fn test_czi_rejected_falls_back_without_install_group() {
    // No install group registered for Bio-Formats, so its check still runs
    let czi = MockReader::rejecting(ReaderKind::Czi);
    let bioformats = MockReader::accepting(ReaderKind::Bioformats);
    let resolver = resolver_with(&[&czi, &bioformats], DependencyAdvisor::empty());

    let resolution = resolver.resolve(&input("img.czi")).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Bioformats);
    assert_eq!(resolution.skipped, vec![Attempt::rejected(ReaderKind::Czi)]);
    assert_eq!(resolution.skipped[0].reason.to_string(), "rejected");
    assert_eq!(bioformats.call_count(), 1);
}

#[tokio::test]
async fn test_tif_all_rejected_lists_every_candidate() {
    let readers = [
        MockReader::rejecting(ReaderKind::OmeTiff),
        MockReader::rejecting(ReaderKind::Tiff),
        MockReader::rejecting(ReaderKind::Bioformats),
        MockReader::rejecting(ReaderKind::Default),
    ];
    let refs: Vec<_> = readers.iter().collect();
    let resolver = resolver_with(&refs, DependencyAdvisor::empty());

    let err = resolver.resolve(&input("img.tif")).await.unwrap_err();

    match &err {
        ResolveError::NoReaderAccepted {
            extension,
            attempted,
        } => {
            assert_eq!(extension, "tif");
            assert_eq!(
                attempted,
                &vec![
                    Attempt::rejected(ReaderKind::OmeTiff),
                    Attempt::rejected(ReaderKind::Tiff),
                    Attempt::rejected(ReaderKind::Bioformats),
                    Attempt::rejected(ReaderKind::Default),
                ]
            );
        }
        other => panic!("Expected NoReaderAccepted, got {other:?}"),
    }

    let message = err.to_string();
    assert!(message.contains("OmeTiffReader (rejected)"));
    assert!(message.contains("DefaultReader (rejected)"));
    for reader in &readers {
        assert_eq!(reader.call_count(), 1);
    }
}

#[tokio::test]
async fn test_failed_check_does_not_block_next_candidate() {
    let ome = MockReader::new(ReaderKind::OmeTiff, MockAnswer::Fail);
    let tiff = MockReader::accepting(ReaderKind::Tiff);
    let resolver = resolver_with(&[&ome, &tiff], DependencyAdvisor::empty());

    let resolution = resolver.resolve(&input("img.ome.tif")).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Tiff);
    assert_eq!(resolution.route.to_string(), "ome.tif");
    match &resolution.skipped[0].reason {
        SkipReason::CapabilityCheckFailed { cause } => assert!(cause.contains("mock failure")),
        other => panic!("Expected CapabilityCheckFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_continues_chain() {
    let ome = MockReader::new(ReaderKind::OmeTiff, MockAnswer::Sleep(Duration::from_secs(30)));
    let tiff = MockReader::accepting(ReaderKind::Tiff);
    let resolver = resolver_with(&[&ome, &tiff], DependencyAdvisor::empty())
        .with_check_timeout(Duration::from_millis(20));

    let resolution = resolver.resolve(&input("img.tiff")).await.unwrap();

    assert_eq!(resolution.reader, ReaderKind::Tiff);
    assert_eq!(
        resolution.skipped,
        vec![Attempt::new(
            ReaderKind::OmeTiff,
            SkipReason::TimedOut { after_ms: 20 }
        )]
    );
}

#[tokio::test]
async fn test_generic_first_ordering_preserved() {
    let default = MockReader::accepting(ReaderKind::Default);
    let bioformats = MockReader::accepting(ReaderKind::Bioformats);
    let resolver = resolver_with(&[&default, &bioformats], DependencyAdvisor::empty());

    let dcm = resolver.resolve(&input("scan.dcm")).await.unwrap();
    assert_eq!(dcm.reader, ReaderKind::Bioformats);

    let avi = resolver.resolve(&input("movie.avi")).await.unwrap();
    assert_eq!(avi.reader, ReaderKind::Default);
}

// =============================================================================
// Dependency Advisor
// =============================================================================

#[tokio::test]
async fn test_unavailable_reader_never_checked() {
    let czi = MockReader::accepting(ReaderKind::Czi);
    let bioformats = MockReader::accepting(ReaderKind::Bioformats);
    let advisor = DependencyAdvisor::builtin().with_unavailable(InstallGroup::Czi);
    let resolver = resolver_with(&[&czi, &bioformats], advisor);

    let resolution = resolver.resolve(&input("img.czi")).await.unwrap();

    assert_eq!(czi.call_count(), 0);
    assert_eq!(resolution.reader, ReaderKind::Bioformats);
    assert_eq!(
        resolution.skipped,
        vec![Attempt::new(
            ReaderKind::Czi,
            SkipReason::MissingOptionalDependency {
                install_group: InstallGroup::Czi
            }
        )]
    );
}

#[tokio::test]
async fn test_unavailable_reader_never_reads_bytes() {
    let source = TrackingReader::new("img.lif", vec![0u8; 64]);
    let input = InputDescriptor::from_reader(source.clone());
    let advisor = DependencyAdvisor::builtin()
        .with_unavailable(InstallGroup::Lif)
        .with_unavailable(InstallGroup::Bioformats);
    let resolver = Resolver::new(builtin_registry(), ReaderSet::builtin(), advisor);

    let err = resolver.resolve(&input).await.unwrap_err();

    assert_eq!(source.read_count(), 0);
    match err {
        ResolveError::MissingOptionalDependency {
            extension,
            reader,
            install_group,
            attempted,
        } => {
            assert_eq!(extension, "lif");
            assert_eq!(reader, ReaderKind::Lif);
            assert_eq!(install_group, InstallGroup::Lif);
            assert_eq!(attempted.len(), 2);
        }
        other => panic!("Expected MissingOptionalDependency, got {other:?}"),
    }
}

#[tokio::test]
async fn test_install_groups_reported_for_partial_miss() {
    let tiff = MockReader::rejecting(ReaderKind::Tiff);
    let ome = MockReader::rejecting(ReaderKind::OmeTiff);
    let advisor = DependencyAdvisor::builtin()
        .with_unavailable(InstallGroup::Bioformats)
        .with_unavailable(InstallGroup::BaseImageio);
    let resolver = resolver_with(&[&ome, &tiff], advisor);

    let err = resolver.resolve(&input("img.tif")).await.unwrap_err();

    assert!(matches!(err, ResolveError::NoReaderAccepted { .. }));
    assert_eq!(
        err.install_groups(),
        vec![InstallGroup::Bioformats, InstallGroup::BaseImageio]
    );
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_unknown_extension() {
    let resolver = resolver_with(&[], DependencyAdvisor::empty());

    let err = resolver.resolve(&input("data.xyz123")).await.unwrap_err();

    match &err {
        ResolveError::UnsupportedFormat { extension } => assert_eq!(extension, "xyz123"),
        other => panic!("Expected UnsupportedFormat, got {other:?}"),
    }
    assert!(err.attempted().is_empty());
}

#[tokio::test]
async fn test_invalid_extension_text_is_unsupported() {
    let default = MockReader::accepting(ReaderKind::Default);
    let resolver = resolver_with(&[&default], DependencyAdvisor::empty());

    for (name, raw) in [
        ("photo.png ", "png "),
        ("scan.t if", "t if"),
        ("scan.XYZ 1", "xyz 1"),
    ] {
        let err = resolver.resolve(&input(name)).await.unwrap_err();
        match &err {
            ResolveError::UnsupportedFormat { extension } => assert_eq!(extension, raw),
            other => panic!("Expected UnsupportedFormat for {name:?}, got {other:?}"),
        }
        assert!(resolver.plan(&input(name)).is_err());
    }
    assert_eq!(default.call_count(), 0);
}

#[tokio::test]
async fn test_mixed_case_matches_lowercase() {
    let tiff = MockReader::accepting(ReaderKind::Tiff);
    let ome = MockReader::rejecting(ReaderKind::OmeTiff);
    let resolver = resolver_with(&[&ome, &tiff], DependencyAdvisor::empty());

    let upper = resolver.resolve(&input("sample.TIFF")).await.unwrap();
    let lower = resolver.resolve(&input("sample.tiff")).await.unwrap();

    assert_eq!(upper, lower);
}

#[tokio::test]
async fn test_compound_extension_routes() {
    let resolver = resolver_with(&[], DependencyAdvisor::empty());

    let plan = resolver.plan(&input("brain.nii.gz")).unwrap();
    assert_eq!(plan.route.to_string(), "nii.gz");
    let readers: Vec<_> = plan.candidates.iter().map(|c| c.reader).collect();
    assert_eq!(readers, vec![ReaderKind::Bioformats, ReaderKind::Default]);
}

#[tokio::test]
async fn test_extensionless_input_uses_generic_fallback() {
    let default = MockReader::accepting(ReaderKind::Default);
    let resolver = resolver_with(&[&default], DependencyAdvisor::empty());

    let resolution = resolver.resolve(&input("/data/scans/README")).await.unwrap();

    assert_eq!(resolution.route, Route::NoExtension);
    assert_eq!(resolution.reader, ReaderKind::Default);
}

// =============================================================================
// Determinism and Concurrency
// =============================================================================

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let ome = MockReader::rejecting(ReaderKind::OmeTiff);
    let tiff = MockReader::accepting(ReaderKind::Tiff);
    let resolver = resolver_with(&[&ome, &tiff], DependencyAdvisor::empty());
    let input = input("img.tif");

    let first = resolver.resolve(&input).await.unwrap();
    let second = resolver.resolve(&input).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ome.call_count(), 2);
}

#[tokio::test]
async fn test_resolve_all_keeps_input_order() {
    let czi = MockReader::accepting(ReaderKind::Czi);
    let slow_ome = MockReader::new(ReaderKind::OmeTiff, MockAnswer::Sleep(Duration::from_millis(50)));
    let default = MockReader::accepting(ReaderKind::Default);
    let resolver = resolver_with(&[&czi, &slow_ome, &default], DependencyAdvisor::empty());

    let inputs = vec![
        input("slow.ome.tif"),
        input("fast.czi"),
        input("unknown.qqq"),
        input("photo.png"),
    ];
    let results = resolver.resolve_all(inputs).await;

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().reader, ReaderKind::OmeTiff);
    assert_eq!(results[1].as_ref().unwrap().reader, ReaderKind::Czi);
    assert!(matches!(
        results[2],
        Err(ResolveError::UnsupportedFormat { .. })
    ));
    assert_eq!(results[3].as_ref().unwrap().reader, ReaderKind::Default);
}

#[tokio::test]
async fn test_shared_resolver_across_tasks() {
    let tiff = MockReader::accepting(ReaderKind::Tiff);
    let ome = MockReader::rejecting(ReaderKind::OmeTiff);
    let resolver = Arc::new(resolver_with(&[&ome, &tiff], DependencyAdvisor::empty()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let resolver = Arc::clone(&resolver);
        handles.push(tokio::spawn(async move {
            let input = InputDescriptor::from_bytes(format!("img{}.tif", i), vec![0u8; 8]);
            resolver.resolve(&input).await
        }));
    }

    for handle in handles {
        let resolution = handle.await.unwrap().unwrap();
        assert_eq!(resolution.reader, ReaderKind::Tiff);
    }
    assert_eq!(tiff.call_count(), 8);
}
