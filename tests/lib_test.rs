//! Library integration tests.

use std::path::PathBuf;

use cme::CmeError;

#[test]
fn error_types_are_public() {
    let err = CmeError::ScopeConflict {
        path: PathBuf::from("/exports"),
    };
    assert!(err.to_string().contains("/exports"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> cme::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use cme::cli::{Cli, Commands};

    let cli = Cli::parse_from(["cme", "sync", "--dry-run", "-o", "/tmp/out"]);

    if let Commands::Sync(args) = cli.command {
        assert!(args.dry_run);
        assert!(!args.force);
        assert_eq!(args.output_path, Some(PathBuf::from("/tmp/out")));
    } else {
        panic!("Expected Sync command");
    }
}

#[test]
fn state_round_trips_through_disk() {
    use cme::state::{ExportState, ScopeEntry};

    let dir = tempfile::TempDir::new().unwrap();
    let mut state = ExportState::new("https://wiki.example.com");
    state.scopes.push(ScopeEntry::new("pages", ["42"]));
    state.upsert_page("42", 3, "Docs/Guide.md");
    state.save(dir.path()).unwrap();

    let loaded = ExportState::load_required(dir.path()).unwrap();
    assert_eq!(loaded, state);
}
