use clap::{ArgAction, Parser, Subcommand};
use morse_core::drill::MICRO_BURST_INTERVAL;
use morse_core::emitter::{HapticEmitter, RELEASE_BUFFER};
use morse_core::render::{WavToneEmitter, DEFAULT_SAMPLE_RATE};
use morse_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "morse")]
#[command(about = "Morse code trainer with Farnsworth timing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the generated lesson plan
    Lessons {
        /// Learning method (audhd, koch, logical)
        #[arg(long)]
        method: Option<String>,

        /// Print lessons as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Export one row per exercise to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show element and gap durations
    Timings {
        /// Character speed in WPM
        #[arg(long)]
        wpm: Option<f64>,

        /// Effective (Farnsworth) speed in WPM
        #[arg(long)]
        effective: Option<f64>,
    },

    /// Show the tone/silence schedule for some text
    Schedule {
        text: String,

        /// Treat TEXT as pattern text ('.', '-', ' ' and '/') instead of plain text
        #[arg(long)]
        pattern: bool,
    },

    /// Play text as Morse
    Play {
        text: String,

        /// Render to a WAV file instead of the terminal
        #[arg(long)]
        wav: Option<PathBuf>,
    },

    /// Micro-burst drill over the characters introduced so far
    Drill {
        /// Number of bursts
        #[arg(long, default_value_t = drill::MICRO_BURST_COUNT)]
        reps: usize,

        /// Seed for the random picks
        #[arg(long)]
        seed: Option<u64>,

        /// Pause between bursts in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// List the bursts without sounding them
        #[arg(long)]
        silent: bool,
    },

    /// Mark a lesson day as completed
    Complete { day: u32 },

    /// Show learner progress
    Status,

    /// Switch the learning method
    Method { method: String },

    /// List pattern families for a method
    Families {
        #[arg(long)]
        method: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    morse_core::logging::init(cli.verbose);

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = ProgressStore::in_dir(&data_dir);

    match cli.command {
        Commands::Lessons { method, json, csv } => {
            let method = resolve_method(method.as_deref(), &config)?;
            cmd_lessons(method, json, csv)
        }
        Commands::Timings { wpm, effective } => cmd_timings(&config, wpm, effective),
        Commands::Schedule { text, pattern } => cmd_schedule(&config, &text, pattern),
        Commands::Play { text, wav } => cmd_play(&config, &text, wav),
        Commands::Drill {
            reps,
            seed,
            interval_ms,
            silent,
        } => cmd_drill(&config, &store, reps, seed, interval_ms, silent),
        Commands::Complete { day } => cmd_complete(&config, &store, day),
        Commands::Status => cmd_status(&config, &store),
        Commands::Method { method } => cmd_method(&store, &method),
        Commands::Families { method } => {
            let method = resolve_method(method.as_deref(), &config)?;
            cmd_families(method)
        }
    }
}

fn resolve_method(arg: Option<&str>, config: &Config) -> Result<LearningMethod> {
    match arg {
        Some(name) => name.parse(),
        None => Ok(config.curriculum.method),
    }
}

/// Load the canned plan for a method, refusing to continue if it is inconsistent
fn load_plan(method: LearningMethod) -> Result<&'static MethodPlan> {
    let plan = get_method_plan(method);
    let errors = plan.validate();
    if !errors.is_empty() {
        eprintln!("Plan validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Curriculum(format!("Invalid {} plan", method)));
    }
    Ok(plan)
}

/// Stored progress, or fresh progress for the configured method
fn load_progress(config: &Config, store: &ProgressStore) -> Result<LearnerProgress> {
    let progress = store.load()?;
    if progress.mastery.is_empty() {
        let method = config.curriculum.method;
        return Ok(LearnerProgress::new(method, &load_plan(method)?.progression));
    }
    Ok(progress)
}

/// Player for the configured speeds, with haptics when enabled
///
/// `tone` attaches the terminal tone display; otherwise playback is silent.
fn build_player(config: &Config, tone: bool) -> Result<Player> {
    let player = Player::new(&config.playback)?
        .with_haptic(config.playback.haptic_enabled, TerminalHaptic);
    if !tone {
        return Ok(player);
    }
    let dot = player.timings().dot;
    Ok(player.with_tone(ClockedToneEmitter::init(TerminalSink::new(dot))))
}

fn cmd_lessons(method: LearningMethod, json: bool, csv: Option<PathBuf>) -> Result<()> {
    let lessons = generate_for_plan(load_plan(method)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lessons)?);
        return Ok(());
    }

    if let Some(path) = csv {
        let rows = export::export_lessons_csv(&lessons, &path)?;
        println!("✓ Exported {} exercises to {}", rows, path.display());
        return Ok(());
    }

    println!("\n{} method: {} lessons\n", method, lessons.len());
    for lesson in &lessons {
        println!(
            "  Day {:>2}  {:<40} {:>2} min  {:>3} pts",
            lesson.day, lesson.title, lesson.duration_minutes, lesson.total_points
        );
    }
    println!();
    Ok(())
}

fn cmd_timings(config: &Config, wpm: Option<f64>, effective: Option<f64>) -> Result<()> {
    let char_speed = wpm.unwrap_or(config.playback.char_speed);
    let effective_speed = effective.unwrap_or(config.playback.effective_speed.min(char_speed));
    let timings = derive_timings(char_speed, effective_speed)?;

    println!("\nTiming at {} WPM ({} WPM effective)", char_speed, effective_speed);
    println!("  Dot:        {:>6.1} ms", timings.dot * 1000.0);
    println!("  Dash:       {:>6.1} ms", timings.dash * 1000.0);
    println!("  Symbol gap: {:>6.1} ms", timings.symbol_gap * 1000.0);
    println!("  Char gap:   {:>6.1} ms", timings.char_gap * 1000.0);
    println!("  Word gap:   {:>6.1} ms", timings.word_gap * 1000.0);
    if timings.is_farnsworth() {
        println!("  Farnsworth spacing: on");
    }
    println!();
    Ok(())
}

fn cmd_schedule(config: &Config, text: &str, pattern: bool) -> Result<()> {
    let timings = config.playback.timings()?;
    let events = if pattern {
        scheduler::schedule_text(text, &timings)?
    } else {
        schedule(&scheduler::encode_text(text)?, &timings)
    };

    for event in &events {
        let kind = match event.kind {
            EventKind::Tone => "tone",
            EventKind::Silence => "silence",
        };
        println!(
            "{:>8.3}s  {:<7}  {:>6.1} ms",
            event.offset,
            kind,
            event.duration * 1000.0
        );
    }
    println!("Total: {:.3}s", total_duration(&events));

    if !pattern {
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            if let Some(p) = to_pattern(ch) {
                let pulses: Vec<String> = haptic_pattern(&p, &timings)
                    .iter()
                    .map(u32::to_string)
                    .collect();
                println!("Haptic {}: {}", ch.to_ascii_uppercase(), pulses.join(" "));
            }
        }
    }
    Ok(())
}

fn cmd_play(config: &Config, text: &str, wav: Option<PathBuf>) -> Result<()> {
    let mut player = match wav {
        Some(ref path) => build_player(config, false)?
            .with_tone(WavToneEmitter::init(path, DEFAULT_SAMPLE_RATE)),
        None => build_player(config, true)?,
    };

    let events = player.play_text(text)?;

    match wav {
        Some(path) => println!("✓ Wrote {} to {}", text, path.display()),
        None => {
            // Let the worker finish before dropping the emitter cuts it short
            std::thread::sleep(
                Duration::from_secs_f64(total_duration(&events)) + RELEASE_BUFFER * 2,
            );
            println!();
        }
    }
    Ok(())
}

fn cmd_drill(
    config: &Config,
    store: &ProgressStore,
    reps: usize,
    seed: Option<u64>,
    interval_ms: Option<u64>,
    silent: bool,
) -> Result<()> {
    let progress = load_progress(config, store)?;
    let plan = load_plan(progress.method)?;
    let introduced = progress.introduced(&plan.progression);
    let first = plan.progression.chars()[0];

    let seed = seed.unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    let drill = Drill::micro_burst(&introduced, first, seed)?.with_reps(reps);

    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or(MICRO_BURST_INTERVAL);

    let mut player = build_player(config, !silent)?;

    println!("\nMicro-burst drill: {} bursts (seed {})\n", drill.len(), seed);
    let runner = DrillRunner::new(interval);
    let outcome = runner.run(&drill, &mut player, |rep, ch| {
        let glyphs = display_glyphs(ch).unwrap_or_default();
        println!("  {:>2}. {}  {}", rep + 1, ch, glyphs);
    });

    println!("\n✓ Drill finished: {} of {} bursts", outcome.played, drill.len());
    Ok(())
}

fn cmd_complete(config: &Config, store: &ProgressStore, day: u32) -> Result<()> {
    let fresh = load_progress(config, store)?;
    let lessons = generate_for_plan(load_plan(fresh.method)?)?;
    let lesson = lessons
        .iter()
        .find(|l| l.day == day)
        .ok_or_else(|| Error::Curriculum(format!("No lesson for day {}", day)))?;

    let today = chrono::Local::now().date_naive();
    let progress = store.update(|progress| {
        if progress.mastery.is_empty() {
            *progress = fresh.clone();
        }
        for exercise in &lesson.exercises {
            progress.complete_exercise(exercise);
        }
        progress.complete_lesson(lesson, today);
        Ok(())
    })?;

    println!("\n✓ Day {} complete: {}", lesson.day, lesson.title);
    println!("  Points: {}", progress.points);
    println!("  Streak: {} days", progress.streak_days);
    println!("  Next day: {}", progress.current_day);
    Ok(())
}

fn cmd_status(config: &Config, store: &ProgressStore) -> Result<()> {
    let progress = load_progress(config, store)?;
    let plan = load_plan(progress.method)?;
    let introduced = progress.introduced(&plan.progression);

    println!("\nMethod:      {}", progress.method);
    println!("Current day: {}", progress.current_day);
    println!("Points:      {}", progress.points);
    println!("Streak:      {} days", progress.streak_days);
    if let Some(date) = progress.last_completed {
        println!("Last lesson: {}", date);
    }
    println!(
        "Learned:     {}/{} {}",
        introduced.len(),
        plan.progression.len(),
        introduced.iter().collect::<String>()
    );
    if !progress.badges.is_empty() {
        let badges: Vec<&str> = progress.badges.iter().map(String::as_str).collect();
        println!("Badges:      {}", badges.join(", "));
    }
    println!();
    Ok(())
}

fn cmd_method(store: &ProgressStore, method: &str) -> Result<()> {
    let method: LearningMethod = method.parse()?;
    let plan = load_plan(method)?;

    let progress = store.update(|progress| {
        progress.switch_method(method, &plan.progression);
        Ok(())
    })?;

    println!("✓ Switched to {} method", progress.method);
    Ok(())
}

fn cmd_families(method: LearningMethod) -> Result<()> {
    let plan = load_plan(method)?;
    for family in catalog::pattern_families(&plan.progression) {
        println!("\n{} ({})", family.name, family.description);
        for member in &family.members {
            println!("  {}  {:<6}  {}", member.ch, member.glyphs, member.words);
        }
    }
    println!();
    Ok(())
}

/// Draws tones as blocks on stdout, one block per dot unit
struct TerminalSink {
    dot: f64,
    sounding: bool,
}

impl TerminalSink {
    fn new(dot: f64) -> Self {
        Self {
            dot,
            sounding: false,
        }
    }

    fn draw(&self, s: &str) {
        let mut out = io::stdout();
        let _ = out.write_all(s.as_bytes());
        let _ = out.flush();
    }
}

impl ToneSink for TerminalSink {
    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_pitch(&mut self, pitch_hz: f64) {
        tracing::debug!("Terminal tone at {} Hz", pitch_hz);
    }

    fn tone_on(&mut self, envelope: &Envelope) {
        let units = (envelope.duration / self.dot).round().max(1.0) as usize;
        self.draw(&"█".repeat(units));
        self.sounding = true;
    }

    fn tone_off(&mut self) {
        if self.sounding {
            self.draw(" ");
            self.sounding = false;
        }
    }

    fn release(&mut self) {}
}

/// Shows each vibration pattern as a line of pulse/rest milliseconds
struct TerminalHaptic;

impl HapticEmitter for TerminalHaptic {
    fn vibrate(&mut self, pulses_ms: &[u32]) {
        let steps: Vec<String> = pulses_ms.iter().map(u32::to_string).collect();
        println!("      vibrate {}", steps.join(" "));
    }
}
