use crate::core::layout::{Location, OutputLayout};
use crate::core::overrides::OverrideSet;
use crate::core::schema::{ParameterDecl, ParameterSchema};
use crate::core::value::ValueKind;
use crate::engine::error::EngineError;
use crate::engine::phase::Phase;
use crate::engine::progress::ProgressReporter;
use crate::engine::registry::{PhaseRegistry, RegistryBuilder, RegistryError, Stage};
use crate::engine::sequencer::{PipelineReport, Sequencer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const INPUT_PATH: &str = "input_path";
pub const OUTPUT_PATH: &str = "output_path";
pub const MAX_WORKERS: &str = "max_workers";

pub const GSM_DIR: &str = "1_gsm";
pub const GSM_FILTERED_DIR: &str = "2_gsm_filtered";
pub const NEB_DIR: &str = "3_neb";
pub const NEB_FILTERED_DIR: &str = "4_neb_filtered";
pub const REACTIONS_FILE: &str = "reactions.json";
pub const COMPILED_FILE: &str = "xtb.h5";

pub const CREATE_GSM: &str = "create_gsm";
pub const RUN_GSM: &str = "run_gsm";
pub const FILTER_GSM: &str = "filter_gsm";
pub const RUN_NEB: &str = "run_neb";
pub const FILTER_NEB: &str = "filter_neb";
pub const COMPILE_NEB: &str = "compile_neb";

/// Stage keys and titles, in execution order.
pub const STAGES: [(&str, &str); 6] = [
    (CREATE_GSM, "1. Creating GSM"),
    (RUN_GSM, "2. Running GSM"),
    (FILTER_GSM, "3. Filtering GSM"),
    (RUN_NEB, "4. Running NEB"),
    (FILTER_NEB, "5. Filtering NEB"),
    (COMPILE_NEB, "6. Compiling samples"),
];

/// The three inputs of a sampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub max_workers: u32,
}

/// One implementation per sampling stage.
pub struct SamplePhases {
    pub create_gsm: Box<dyn Phase>,
    pub run_gsm: Box<dyn Phase>,
    pub filter_gsm: Box<dyn Phase>,
    pub run_neb: Box<dyn Phase>,
    pub filter_neb: Box<dyn Phase>,
    pub compile_neb: Box<dyn Phase>,
}

/// User-supplied values keyed by stage.
pub type StageOverrides = BTreeMap<String, OverrideSet>;

/// The parameters the pipeline itself supplies to a stage.
///
/// Returns `None` for a key that is not one of [`STAGES`].
pub fn base_schema(stage: &str) -> Option<ParameterSchema> {
    let input = || {
        ParameterDecl::new(INPUT_PATH, ValueKind::Path)
            .required()
            .help("Input location produced by the previous stage")
    };
    let output = || {
        ParameterDecl::new(OUTPUT_PATH, ValueKind::Path)
            .required()
            .help("Output location owned by this stage")
    };
    let workers = || {
        ParameterDecl::new(MAX_WORKERS, ValueKind::Integer)
            .default_value(1i64)
            .help("Number of worker processes")
    };

    let decls = match stage {
        CREATE_GSM | FILTER_GSM | FILTER_NEB | COMPILE_NEB => vec![input(), output()],
        RUN_GSM => vec![input(), workers()],
        RUN_NEB => vec![input(), output(), workers()],
        _ => return None,
    };

    let mut schema = ParameterSchema::new(stage);
    for decl in decls {
        // Names above are distinct, so declaration cannot fail.
        schema.declare(decl).ok()?;
    }
    Some(schema)
}

fn title_of(key: &str) -> &str {
    STAGES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, title)| *title)
        .unwrap_or(key)
}

/// Builds the six-stage registry with every stage reading from the stage before it.
pub fn build_registry(
    request: &SampleRequest,
    phases: SamplePhases,
    mut extra: StageOverrides,
) -> Result<PhaseRegistry, RegistryError> {
    if let Some(unknown) = extra
        .keys()
        .find(|k| !STAGES.iter().any(|(key, _)| *key == k.as_str()))
    {
        return Err(RegistryError::UnknownOverrideTarget(unknown.clone()));
    }

    let stage = |key: &str, phase: Box<dyn Phase>| Stage::new(key, title_of(key), phase);

    let stages = vec![
        stage(CREATE_GSM, phases.create_gsm)
            .set(INPUT_PATH, request.input_path.clone())
            .output(OUTPUT_PATH, Location::dir(GSM_DIR)),
        stage(RUN_GSM, phases.run_gsm).input_from(INPUT_PATH, CREATE_GSM),
        stage(FILTER_GSM, phases.filter_gsm)
            .input_from(INPUT_PATH, CREATE_GSM)
            .output(OUTPUT_PATH, Location::dir(GSM_FILTERED_DIR)),
        stage(RUN_NEB, phases.run_neb)
            .input_from(INPUT_PATH, FILTER_GSM)
            .output(OUTPUT_PATH, Location::dir(NEB_DIR)),
        stage(FILTER_NEB, phases.filter_neb)
            .input_from(INPUT_PATH, RUN_NEB)
            .output(OUTPUT_PATH, Location::dir(NEB_FILTERED_DIR)),
        stage(COMPILE_NEB, phases.compile_neb)
            .input_from_file(INPUT_PATH, FILTER_NEB, REACTIONS_FILE)
            .output(OUTPUT_PATH, Location::file(COMPILED_FILE)),
    ];

    let mut builder = RegistryBuilder::new(OutputLayout::new(&request.output_path));
    for stage in stages {
        let declares_workers = stage.phase().schema().contains(MAX_WORKERS);
        let mut stage = if declares_workers {
            stage.set(MAX_WORKERS, request.max_workers)
        } else {
            stage
        };
        if let Some(values) = extra.remove(stage.key()) {
            stage = stage.extend(values);
        }
        builder = builder.stage(stage);
    }
    builder.build()
}

/// Creates the destination root, failing before any phase runs if it cannot.
pub fn prepare_output_root(path: &Path) -> Result<(), EngineError> {
    std::fs::create_dir_all(path).map_err(|source| EngineError::Environment {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(skip_all, name = "sample_workflow")]
pub fn run(
    request: &SampleRequest,
    phases: SamplePhases,
    extra: StageOverrides,
    sequencer: &Sequencer,
    reporter: &ProgressReporter,
) -> Result<PipelineReport, EngineError> {
    info!(
        input = %request.input_path.display(),
        output = %request.output_path.display(),
        max_workers = request.max_workers,
        "Starting sampling pipeline."
    );
    prepare_output_root(&request.output_path)?;
    let registry = build_registry(request, phases, extra)?;
    let report = sequencer.run_all(&registry, reporter)?;
    info!(
        "Sampling pipeline complete in {:.1}s.",
        report.total_elapsed().as_secs_f64()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::ParameterValue;
    use crate::engine::config::EffectiveConfiguration;
    use crate::engine::error::PhaseError;
    use crate::engine::phase::FnPhase;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    type Received = Arc<Mutex<Vec<(String, EffectiveConfiguration)>>>;

    fn stub(key: &'static str, sink: Received) -> Box<dyn Phase> {
        Box::new(FnPhase::new(
            move || base_schema(key).unwrap(),
            move |config| {
                sink.lock().unwrap().push((key.to_string(), config));
                Ok(())
            },
        ))
    }

    fn stub_phases(sink: &Received) -> SamplePhases {
        SamplePhases {
            create_gsm: stub(CREATE_GSM, sink.clone()),
            run_gsm: stub(RUN_GSM, sink.clone()),
            filter_gsm: stub(FILTER_GSM, sink.clone()),
            run_neb: stub(RUN_NEB, sink.clone()),
            filter_neb: stub(FILTER_NEB, sink.clone()),
            compile_neb: stub(COMPILE_NEB, sink.clone()),
        }
    }

    fn request(root: &Path) -> SampleRequest {
        SampleRequest {
            input_path: PathBuf::from("/data/mothers"),
            output_path: root.to_path_buf(),
            max_workers: 6,
        }
    }

    #[test]
    fn stages_are_wired_like_the_directory_convention() {
        let sink: Received = Arc::default();
        let root = PathBuf::from("/runs/x");
        let registry =
            build_registry(&request(&root), stub_phases(&sink), StageOverrides::new()).unwrap();

        assert_eq!(
            registry.titles(),
            STAGES.iter().map(|(_, t)| *t).collect::<Vec<_>>()
        );

        let path_of = |stage: &str, param: &str| {
            registry
                .get(stage)
                .unwrap()
                .overrides()
                .get(param)
                .cloned()
        };
        let p = |s: &str| Some(ParameterValue::Path(PathBuf::from(s)));

        assert_eq!(path_of(CREATE_GSM, INPUT_PATH), p("/data/mothers"));
        assert_eq!(path_of(CREATE_GSM, OUTPUT_PATH), p("/runs/x/1_gsm"));
        assert_eq!(path_of(RUN_GSM, INPUT_PATH), p("/runs/x/1_gsm"));
        assert_eq!(path_of(RUN_GSM, OUTPUT_PATH), None);
        assert_eq!(path_of(FILTER_GSM, INPUT_PATH), p("/runs/x/1_gsm"));
        assert_eq!(path_of(FILTER_GSM, OUTPUT_PATH), p("/runs/x/2_gsm_filtered"));
        assert_eq!(path_of(RUN_NEB, INPUT_PATH), p("/runs/x/2_gsm_filtered"));
        assert_eq!(path_of(RUN_NEB, OUTPUT_PATH), p("/runs/x/3_neb"));
        assert_eq!(path_of(FILTER_NEB, INPUT_PATH), p("/runs/x/3_neb"));
        assert_eq!(path_of(FILTER_NEB, OUTPUT_PATH), p("/runs/x/4_neb_filtered"));
        assert_eq!(
            path_of(COMPILE_NEB, INPUT_PATH),
            p("/runs/x/4_neb_filtered/reactions.json")
        );
        assert_eq!(path_of(COMPILE_NEB, OUTPUT_PATH), p("/runs/x/xtb.h5"));
    }

    #[test]
    fn worker_count_reaches_only_stages_that_declare_it() {
        let sink: Received = Arc::default();
        let registry = build_registry(
            &request(Path::new("/runs/x")),
            stub_phases(&sink),
            StageOverrides::new(),
        )
        .unwrap();

        for (key, _) in STAGES {
            let has = registry.get(key).unwrap().overrides().contains(MAX_WORKERS);
            assert_eq!(has, key == RUN_GSM || key == RUN_NEB, "stage {}", key);
        }
        assert_eq!(
            registry.get(RUN_NEB).unwrap().overrides().get(MAX_WORKERS),
            Some(&ParameterValue::Integer(6))
        );
    }

    #[test]
    fn full_run_creates_root_and_invokes_every_stage() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("out");
        let sink: Received = Arc::default();

        let report = run(
            &request(&root),
            stub_phases(&sink),
            StageOverrides::new(),
            &Sequencer::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(root.is_dir());
        assert_eq!(report.phases.len(), 6);
        let received = sink.lock().unwrap();
        let order: Vec<_> = received.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            order,
            STAGES.iter().map(|(k, _)| *k).collect::<Vec<_>>()
        );
        let (_, compile) = &received[5];
        assert_eq!(compile.path(OUTPUT_PATH), Some(root.join("xtb.h5").as_path()));
    }

    #[test]
    fn extra_overrides_for_unknown_stage_are_rejected() {
        let sink: Received = Arc::default();
        let mut extra = StageOverrides::new();
        extra.insert("run_md".to_string(), OverrideSet::new().with("steps", 10i64));
        let result = build_registry(&request(Path::new("/r")), stub_phases(&sink), extra);
        assert!(matches!(
            result,
            Err(RegistryError::UnknownOverrideTarget(ref s)) if s == "run_md"
        ));
    }

    #[test]
    fn worker_count_cannot_be_overridden_per_stage() {
        let sink: Received = Arc::default();
        let mut extra = StageOverrides::new();
        extra.insert(RUN_GSM.to_string(), OverrideSet::new().with(MAX_WORKERS, 2i64));
        let result = build_registry(&request(Path::new("/r")), stub_phases(&sink), extra);
        assert!(matches!(result, Err(RegistryError::WiredParameter { .. })));
    }

    #[test]
    fn uncreatable_root_is_an_environment_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = prepare_output_root(&blocker.join("out")).unwrap_err();
        assert!(matches!(err, EngineError::Environment { .. }));
    }

    #[test]
    fn failing_stage_stops_later_stages() {
        let dir = tempdir().unwrap();
        let sink: Received = Arc::default();
        let mut phases = stub_phases(&sink);
        phases.filter_gsm = Box::new(FnPhase::new(
            || base_schema(FILTER_GSM).unwrap(),
            |_| Err(PhaseError::Message("no reactions survived".to_string())),
        ));

        let err = run(
            &request(dir.path()),
            phases,
            StageOverrides::new(),
            &Sequencer::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert_eq!(err.phase(), Some("3. Filtering GSM"));
        let received = sink.lock().unwrap();
        assert_eq!(received.len(), 2);
    }

    #[test]
    fn base_schema_is_unknown_for_foreign_stage() {
        assert!(base_schema("run_md").is_none());
        assert!(base_schema(RUN_GSM).unwrap().contains(MAX_WORKERS));
    }
}
