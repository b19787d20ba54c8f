use super::*;

fn args_of(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn env_of(cmd: &Command, key: &str) -> Option<Option<String>> {
    cmd.get_envs()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.map(|v| v.to_string_lossy().into_owned()))
}

#[test]
fn conda_launcher_builds_the_expected_prefix() {
    let l = StageLauncher::conda("vid2e", "upsampling/upsample.py");
    assert_eq!(
        l.command,
        [
            "conda",
            "run",
            "-n",
            "vid2e",
            "--no-capture-output",
            "python",
            "upsampling/upsample.py"
        ]
    );
}

#[test]
fn simulate_command_carries_directories_and_thresholds() {
    let stage = ExternalStage::new(
        StageLauncher::from_command(["python", "sim.py"]),
        "up",
        "ev",
        SimulateParams {
            ct_pos: 0.25,
            ..SimulateParams::default()
        },
    );
    let cmd = stage.command().unwrap();
    assert_eq!(cmd.get_program(), "python");
    assert_eq!(
        args_of(&cmd),
        [
            "sim.py",
            "--input_dir",
            "up",
            "--output_dir",
            "ev",
            "--contrast_threshold_pos",
            "0.25",
            "--contrast_threshold_neg",
            "0.2",
            "--refractory_period_ns",
            "0"
        ]
    );
    assert_eq!(env_of(&cmd, "CUDA_VISIBLE_DEVICES"), None);
}

#[test]
fn upsample_device_selects_visible_gpus() {
    let gpu = ExternalStage::new(
        StageLauncher::default(),
        "in",
        "out",
        UpsampleParams { device: 1 },
    );
    assert_eq!(
        env_of(&gpu.command().unwrap(), "CUDA_VISIBLE_DEVICES"),
        Some(Some("1".to_owned()))
    );

    let cpu = ExternalStage::new(
        StageLauncher::default(),
        "in",
        "out",
        UpsampleParams { device: -1 },
    );
    assert_eq!(
        env_of(&cpu.command().unwrap(), "CUDA_VISIBLE_DEVICES"),
        Some(Some(String::new()))
    );
}

#[test]
fn empty_launcher_is_rejected() {
    let stage = ExternalStage::new(
        StageLauncher::from_command(Vec::<String>::new()),
        "in",
        "out",
        UpsampleParams::default(),
    );
    assert!(matches!(stage.command(), Err(EvError::Validation(_))));
}

#[test]
fn unlaunchable_program_is_a_stage_error() {
    let stage = ExternalStage::new(
        StageLauncher::from_command(["evrender-no-such-program-on-path"]),
        "in",
        "out",
        UpsampleParams::default(),
    );
    assert!(matches!(stage.run(), Err(EvError::ExternalStage(_))));
}

#[cfg(unix)]
#[test]
fn exit_status_decides_success() {
    let ok = ExternalStage::new(
        StageLauncher::from_command(["sh", "-c", "exit 0", "stage"]),
        "in",
        "out",
        SimulateParams::default(),
    );
    let outcome = ok.run().unwrap();
    assert_eq!(outcome.stage, "simulate");
    assert!(outcome.status.success());

    let failing = ExternalStage::new(
        StageLauncher::from_command(["sh", "-c", "exit 3", "stage"]),
        "in",
        "out",
        SimulateParams::default(),
    );
    let err = failing.run().unwrap_err();
    assert!(matches!(err, EvError::ExternalStage(_)), "{err}");
}

#[cfg(unix)]
#[test]
fn stage_receives_its_directories() {
    let dir = PathBuf::from("target").join("unit_stages");
    std::fs::create_dir_all(&dir).unwrap();
    let marker = dir.join("args.txt");
    let _ = std::fs::remove_file(&marker);

    let stage = ExternalStage::new(
        StageLauncher::from_command([
            "sh".to_owned(),
            "-c".to_owned(),
            format!("echo \"$@\" > {}", marker.display()),
            "stage".to_owned(),
        ]),
        "frames",
        "upsampled",
        UpsampleParams::default(),
    );
    stage.run().unwrap();
    let written = std::fs::read_to_string(&marker).unwrap();
    assert_eq!(written.trim(), "--input_dir frames --output_dir upsampled");
}
