//! End-to-end corpus build tests

use std::path::Path;

use mtg_corpus::codec::Decoder;
use mtg_corpus::pipeline::{
    BuildManifest, BuildStage, CorpusBuilder, CorpusConfig, PipelineError, RunStatus, read_corpus,
};
use serde_json::json;
use tempfile::TempDir;

fn write_database(dir: &Path) -> std::path::PathBuf {
    let bear = |uuid: &str| {
        json!({
            "name": "Grizzly Bears", "manaCost": "{1}{G}", "rarity": "common",
            "types": ["Creature"], "subtypes": ["Bear"], "power": "2", "toughness": "2",
            "uuid": uuid, "layout": "normal"
        })
    };
    let db = json!({
        "meta": {"version": "5.2.2"},
        "data": {
            "AAA": {"name": "Alpha", "code": "AAA", "type": "expansion", "cards": [
                bear("aaa-1"),
                {"name": "Giant Growth", "manaCost": "{G}", "rarity": "common",
                 "types": ["Instant"], "text": "Target creature gets +3/+3 until end of turn.",
                 "uuid": "aaa-2", "layout": "normal"},
                {"name": "Serra Angel", "manaCost": "{3}{W}{W}", "rarity": "uncommon",
                 "types": ["Creature"], "subtypes": ["Angel"], "power": "4", "toughness": "4",
                 "text": "Flying (This creature can't be blocked except by creatures with flying or reach.)",
                 "uuid": "aaa-3", "layout": "normal"},
                {"name": "Blank Sorcery", "manaCost": "{1}", "rarity": "common",
                 "types": ["Sorcery"], "uuid": "aaa-4", "layout": "normal"},
                {"name": "Broken Bear", "rarity": "common", "types": ["Creature"],
                 "power": "2", "uuid": "aaa-5"},
                {"name": "Soldier", "rarity": "common", "types": ["Creature"],
                 "power": "1", "toughness": "1", "uuid": "aaa-6", "layout": "token"}
            ]},
            "BBB": {"name": "Beta", "code": "BBB", "type": "expansion", "cards": [
                bear("bbb-1")
            ]},
            "UNF": {"name": "Unfinity", "code": "UNF", "type": "funny", "cards": [
                {"name": "Silly Goose", "rarity": "common", "types": ["Creature"],
                 "power": "1", "toughness": "1", "text": "Honk.", "uuid": "unf-1"}
            ]}
        }
    });
    let path = dir.join("AllPrintings.json");
    std::fs::write(&path, serde_json::to_string_pretty(&db).unwrap()).unwrap();
    path
}

mod build_tests {
    use super::*;

    #[test]
    fn test_full_build() {
        let temp = TempDir::new().unwrap();
        let input = write_database(temp.path());
        let out = temp.path().join("out");

        let config = CorpusConfig::new()
            .with_name("fixture")
            .with_input(&input)
            .with_output_dir(&out);
        let mut builder = CorpusBuilder::new(config).unwrap();
        let report = builder.run().unwrap();

        assert!(report.is_success());
        assert_eq!(report.stages_completed, BuildStage::all());

        let counts = report.counts;
        assert_eq!(counts.sets, 3);
        assert_eq!(counts.parsed, 7);
        assert_eq!(counts.unparsed, 1);
        assert_eq!(counts.valid, 4);
        assert_eq!(counts.invalid, 1);
        assert_eq!(counts.skipped, 2);
        assert_eq!(counts.duplicates, 1);
        assert_eq!(counts.encoded, 3);

        let lines = read_corpus(&out.join("corpus.txt")).unwrap();
        assert_eq!(lines.len(), 3);
        let raw = std::fs::read_to_string(out.join("corpus.txt")).unwrap();
        assert!(raw.ends_with('\n'));

        let angel = Decoder::standard().decode(&lines[2]).unwrap();
        assert_eq!(angel.name, "Serra Angel");
        assert_eq!(angel.main_text.as_deref(), Some("Flying"));

        let corpus = report.corpus.unwrap();
        assert_eq!(corpus.cards, 3);
        assert_eq!(corpus.sha256.len(), 64);

        for dump in ["original", "standardized", "roundtripped", "mismatches"] {
            assert!(out.join(format!("{dump}.yaml")).exists(), "{dump}.yaml missing");
        }

        let manifest = BuildManifest::load(&BuildManifest::default_path(&out)).unwrap();
        assert_eq!(manifest.run_id, report.run_id);
        assert_eq!(manifest.status, RunStatus::Completed);
        assert_eq!(manifest.name.as_deref(), Some("fixture"));
        assert_eq!(manifest.counts, counts);
        let encode = manifest.get_stage_output(BuildStage::Encode).unwrap();
        assert_eq!(encode.metadata["cards"], json!(3));
    }

    #[test]
    fn test_build_without_dedup_or_verify() {
        let temp = TempDir::new().unwrap();
        let input = write_database(temp.path());
        let out = temp.path().join("out");

        let config = CorpusConfig::new()
            .with_input(&input)
            .with_output_dir(&out)
            .with_deduplicate(false)
            .with_verify(false)
            .with_dump_yaml(false);
        let report = CorpusBuilder::new(config).unwrap().run().unwrap();

        assert_eq!(report.counts.encoded, 4);
        assert!(!report.stages_completed.contains(&BuildStage::Verify));
        assert!(report.outputs["verify"].skipped);
        assert!(!out.join("standardized.yaml").exists());
    }

    #[test]
    fn test_partial_build_stops_after_validation() {
        let temp = TempDir::new().unwrap();
        let input = write_database(temp.path());
        let out = temp.path().join("out");

        let config = CorpusConfig::new()
            .with_input(&input)
            .with_output_dir(&out)
            .with_stages(vec![BuildStage::Normalize, BuildStage::Validate]);
        let mut builder = CorpusBuilder::new(config).unwrap();
        let report = builder.run().unwrap();

        assert_eq!(report.counts.valid, 4);
        assert_eq!(builder.valid_cards().len(), 4);
        assert!(report.corpus.is_none());
        assert!(!out.join("corpus.txt").exists());
    }

    #[test]
    fn test_legacy_threshold_is_a_warning_not_an_error() {
        let temp = TempDir::new().unwrap();
        let input = write_database(temp.path());

        let config = CorpusConfig::new()
            .with_input(&input)
            .with_output_dir(temp.path().join("out"))
            .with_bad_count_threshold(0);
        let report = CorpusBuilder::new(config).unwrap().run().unwrap();
        assert!(report.is_success());
        assert_eq!(report.counts.bad_count(), 2);
    }

    #[test]
    fn test_missing_input_fails_and_records_manifest() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let config = CorpusConfig::new()
            .with_input(temp.path().join("nope.json"))
            .with_output_dir(&out);

        let err = CorpusBuilder::new(config).unwrap().run().unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
        assert!(err.user_message().contains("Hint:"));

        let manifest = BuildManifest::load(&BuildManifest::default_path(&out)).unwrap();
        assert_eq!(manifest.status, RunStatus::Failed);
        assert_eq!(manifest.current_stage, Some(BuildStage::Normalize));
    }

    #[test]
    fn test_malformed_database_is_an_import_error() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("bad.json");
        std::fs::write(&input, r#"{"sets": []}"#).unwrap();

        let config = CorpusConfig::new()
            .with_input(&input)
            .with_output_dir(temp.path().join("out"));
        let err = CorpusBuilder::new(config).unwrap().run().unwrap_err();
        assert!(matches!(err, PipelineError::ImportError(_)));
    }

    #[test]
    fn test_toml_config_drives_build() {
        let temp = TempDir::new().unwrap();
        let input = write_database(temp.path());
        let config_path = temp.path().join("build.toml");
        std::fs::write(
            &config_path,
            format!(
                "input = {:?}\noutput_dir = {:?}\nexcluded_set_types = []\ndump_yaml = false\n",
                input.display().to_string(),
                temp.path().join("out").display().to_string()
            ),
        )
        .unwrap();

        let config = CorpusConfig::from_toml_file(&config_path).unwrap();
        let report = CorpusBuilder::new(config).unwrap().run().unwrap();
        assert_eq!(report.counts.skipped, 1);
        assert_eq!(report.counts.encoded, 4);
    }
}
