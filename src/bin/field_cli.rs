#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("field_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glass_engine::optics::{
        DisplacementProfile, FieldMetrics, NEUTRAL_CHANNEL, ProfileKind, RasterBuffer,
        RoundedRect, SpecularOptions, TimingBucket, build_field_2d, compute_displacement_1d,
        compute_specular_2d, encode_field,
    };
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;
    const SNAPSHOT_TABLE_STRIDE: usize = 16;

    const USAGE: &str = r#"field_cli (glass-engine)

USAGE:
  field_cli list
  field_cli run <scenario|all> [options]

SCENARIOS:
  circle_card
  squircle_card
  concave_pill
  lip_button

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.snap, <scenario>.pam and <scenario>.specular.pam to this dir (required for `all`)
  --snap <path>      Write snapshot (single scenario only)
  --pam <path>       Write displacement map as PAM RGBA (single scenario only)
  --no-pam           Skip PAM images when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut pam_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut write_pam = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--pam" => pam_path = Some(PathBuf::from(args.value("--pam")?)),
                "--overwrite" => overwrite = true,
                "--no-pam" => write_pam = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if let Some(dir) = out_dir.as_ref() {
            if snap_path.is_some() || pam_path.is_some() {
                return Err("use either --out-dir or --snap/--pam (not both)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, dir, write_pam, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_name(scenario_name.as_str())
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, dir, write_pam, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario = Scenario::from_name(scenario_name.as_str())
            .ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.snapshot);
        }

        if let Some(path) = pam_path.as_deref() {
            write_pam_file(path, &output.displacement, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        dir: &Path,
        write_pam: bool,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario)?;

        let path = dir.join(format!("{}.snap", output.name));
        write_text_file(&path, &output.snapshot, overwrite)?;
        eprintln!("wrote {}", path.display());

        if write_pam {
            let path = dir.join(format!("{}.pam", output.name));
            write_pam_file(&path, &output.displacement, overwrite)?;
            eprintln!("wrote {}", path.display());

            let path = dir.join(format!("{}.specular.pam", output.name));
            write_pam_file(&path, &output.specular, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn report(output: &ScenarioOutput) {
        eprintln!(
            "{}: samples={} max_abs={:.3} raster={}x{} displaced_pixels={}",
            output.name,
            output.table.len(),
            output.table.max_abs,
            output.displacement.width,
            output.displacement.height,
            displaced_pixels(&output.displacement)
        );
        if let Some(timing) = output.metrics.end() {
            eprintln!(
                "{}: sweep={}ns field={}ns encode={}ns specular={}ns total={:.3}ms",
                output.name,
                timing.profile_sweep_ns,
                timing.field_sweep_ns,
                timing.encoding_ns,
                timing.specular_ns,
                timing.total_ms()
            );
        }
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        ensure_writable(path, overwrite)?;
        fs::write(path, normalize_snapshot_text(text))
            .map_err(|e| format!("write {}: {e}", path.display()))
    }

    /// Netpbm PAM with `TUPLTYPE RGB_ALPHA`; byte order matches the raster.
    fn write_pam_file(path: &Path, raster: &RasterBuffer, overwrite: bool) -> Result<(), String> {
        ensure_writable(path, overwrite)?;

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        write!(
            w,
            "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
            raster.width, raster.height
        )
        .map_err(|e| format!("write pam: {e}"))?;
        w.write_all(&raster.data)
            .map_err(|e| format!("write pam: {e}"))?;

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let value = if value == -0.0 { 0.0 } else { value };
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == -0.0 { 0.0 } else { q }
    }

    fn write_f64(out: &mut String, value: f64) {
        let value = quantize_f64(value);
        let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
    }

    fn displaced_pixels(raster: &RasterBuffer) -> usize {
        raster
            .data
            .chunks_exact(4)
            .filter(|px| px[0] != NEUTRAL_CHANNEL || px[1] != NEUTRAL_CHANNEL)
            .count()
    }

    fn write_table(out: &mut String, table: &DisplacementProfile) {
        let _ = writeln!(out, "table.len {}", table.len());
        let _ = write!(out, "table.max_abs ");
        write_f64(out, table.max_abs);
        let _ = writeln!(out);

        let last = table.len().saturating_sub(1);
        for (i, value) in table.values.iter().enumerate() {
            if i % SNAPSHOT_TABLE_STRIDE != 0 && i != last {
                continue;
            }
            let _ = write!(out, "table.v {i} ");
            write_f64(out, *value);
            let _ = writeln!(out);
        }
    }

    fn write_raster(out: &mut String, label: &str, raster: &RasterBuffer) {
        let _ = writeln!(out, "{label}.size {} {}", raster.width, raster.height);

        let mut sums = [0u64; 4];
        for px in raster.data.chunks_exact(4) {
            for (sum, channel) in sums.iter_mut().zip(px) {
                *sum += u64::from(*channel);
            }
        }
        let _ = writeln!(
            out,
            "{label}.channel_sums {} {} {} {}",
            sums[0], sums[1], sums[2], sums[3]
        );

        let probes = [
            (0, raster.height / 2),
            (raster.width / 2, 0),
            (raster.width / 2, raster.height / 2),
            (raster.width.saturating_sub(1), raster.height / 2),
        ];
        for (x, y) in probes {
            if let Some(px) = raster.pixel(x, y) {
                let _ = writeln!(
                    out,
                    "{label}.px {x} {y} {} {} {} {}",
                    px[0], px[1], px[2], px[3]
                );
            }
        }
    }

    fn snapshot(op: &str, sections: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# glass-engine field v1");
        let _ = writeln!(out, "op {op}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        sections(&mut out);
        normalize_snapshot_text(&out)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        CircleCard,
        SquircleCard,
        ConcavePill,
        LipButton,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::CircleCard,
            Scenario::SquircleCard,
            Scenario::ConcavePill,
            Scenario::LipButton,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::CircleCard => "circle_card",
                Scenario::SquircleCard => "squircle_card",
                Scenario::ConcavePill => "concave_pill",
                Scenario::LipButton => "lip_button",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|s| s.name() == name)
        }

        fn setup(self) -> ScenarioSetup {
            match self {
                Scenario::CircleCard => ScenarioSetup {
                    profile: ProfileKind::ConvexCircle,
                    size: (300, 200),
                    corner_radius: 60.0,
                    bevel_width: 60.0,
                    thickness: 50.0,
                    index: 1.5,
                    samples: 512,
                },
                Scenario::SquircleCard => ScenarioSetup {
                    profile: ProfileKind::ConvexSquircle,
                    size: (300, 200),
                    corner_radius: 40.0,
                    bevel_width: 30.0,
                    thickness: 60.0,
                    index: 1.5,
                    samples: 128,
                },
                Scenario::ConcavePill => ScenarioSetup {
                    profile: ProfileKind::Concave,
                    size: (320, 96),
                    corner_radius: 48.0,
                    bevel_width: 24.0,
                    thickness: 30.0,
                    index: 1.45,
                    samples: 128,
                },
                Scenario::LipButton => ScenarioSetup {
                    profile: ProfileKind::Lip,
                    size: (160, 160),
                    corner_radius: 80.0,
                    bevel_width: 40.0,
                    thickness: 40.0,
                    index: 1.7,
                    samples: 256,
                },
            }
        }
    }

    struct ScenarioSetup {
        profile: ProfileKind,
        size: (usize, usize),
        corner_radius: f64,
        bevel_width: f64,
        thickness: f64,
        index: f64,
        samples: usize,
    }

    struct ScenarioOutput {
        name: &'static str,
        table: DisplacementProfile,
        displacement: RasterBuffer,
        specular: RasterBuffer,
        metrics: FieldMetrics,
        snapshot: String,
    }

    fn run_scenario(scenario: Scenario) -> Result<ScenarioOutput, String> {
        let setup = scenario.setup();
        let (width, height) = setup.size;
        let shape = RoundedRect::new(
            width as f64,
            height as f64,
            setup.corner_radius,
            setup.bevel_width,
        )
        .map_err(|e| e.to_string())?;

        let mut metrics = FieldMetrics::default();
        metrics.begin();

        let table = metrics.time(TimingBucket::ProfileSweep, || {
            compute_displacement_1d(
                &setup.profile,
                setup.bevel_width,
                setup.thickness,
                setup.index,
                setup.samples,
            )
        });
        let field = metrics
            .time(TimingBucket::FieldSweep, || {
                build_field_2d(width, height, &shape, &table.values)
            })
            .map_err(|e| e.to_string())?;
        let displacement = metrics
            .time(TimingBucket::Encoding, || encode_field(&field, table.max_abs))
            .map_err(|e| e.to_string())?;
        let specular = metrics
            .time(TimingBucket::Specular, || {
                compute_specular_2d(width, height, &shape, &SpecularOptions::default())
            })
            .map_err(|e| e.to_string())?;

        let snapshot = snapshot(scenario.name(), |out| {
            let _ = writeln!(out, "profile {}", setup.profile);
            let _ = write!(out, "glass ");
            write_f64(out, setup.bevel_width);
            let _ = write!(out, " ");
            write_f64(out, setup.thickness);
            let _ = write!(out, " ");
            write_f64(out, setup.index);
            let _ = writeln!(out);
            write_table(out, &table);
            write_raster(out, "displacement", &displacement);
            write_raster(out, "specular", &specular);
        });

        Ok(ScenarioOutput {
            name: scenario.name(),
            table,
            displacement,
            specular,
            metrics,
            snapshot,
        })
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
