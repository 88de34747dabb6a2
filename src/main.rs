//! CalmPath CLI - Slice 1-5
//!
//! Usage:
//!   calmpath --text "your text here"        # Single assessment
//!   calmpath --interactive                  # Interactive companion session
//!   calmpath --breathe box                  # Standalone breathing exercise
//!   calmpath --serve                        # HTTP API server
//!   calmpath --text "text" --json           # JSON output

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use calmpath::core::adapter::normalize_assessment;
use calmpath::core::checklist::SafetyChecklist;
use calmpath::core::provider::TriageProvider;
use calmpath::core::session::{Narrator, SessionError};
use calmpath::core::store::OfflineStore;
use calmpath::core::triage::QUICK_PRESETS;
use calmpath::core::{run_server, CrisisSession, PhaseCycler, TriageEngine};
use calmpath::types::{
    Assessment, BreathingPattern, FlowEvent, LinkState, Severity, Speaker, TriageReport,
    TutorialPhase,
};
use calmpath::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "calmpath",
    version = VERSION,
    about = "CalmPath - Crisis companion with guided steps and breathing",
    long_about = "CalmPath walks people through emergencies one step at a time.\n\n\
                  It assesses free-text descriptions of a situation, builds a\n\
                  step-by-step action plan, and paces the user through it.\n\n\
                  Modes:\n  \
                  --text         One-shot assessment of a single message\n  \
                  --interactive  Full companion session (default)\n  \
                  --breathe      Guided breathing exercise (box | 478 | quick)\n  \
                  --serve        HTTP API server mode\n\n\
                  Urgency levels:\n  \
                  Calm      - Situation manageable\n  \
                  Stressed  - Elevated urgency\n  \
                  Panic     - Immediate danger, escalation shown first"
)]
struct Args {
    /// Text to assess (single mode)
    #[arg(short, long)]
    text: Option<String>,

    /// Interactive companion session - read lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run a breathing exercise: box, 478 or quick
    #[arg(short, long)]
    breathe: Option<String>,

    /// Laps to run in breathing mode
    #[arg(long, default_value_t = 3)]
    laps: u32,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show cue breakdown
    #[arg(long)]
    verbose: bool,

    /// Echo companion guidance as read-aloud lines
    #[arg(long)]
    speak: bool,

    /// Directory for persisted answers and checklist (default: ./calmpath-data)
    #[arg(long, default_value = "./calmpath-data")]
    store_dir: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();

    if args.serve {
        run_serve(&args).await;
    } else if let Some(ref key) = args.breathe {
        run_breathe(key, &args);
    } else if args.interactive {
        run_interactive(&args).await;
    } else if let Some(ref text) = args.text {
        run_single(text, &args);
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args).await;
    }
}

/// Run single text assessment
fn run_single(text: &str, args: &Args) {
    let engine = TriageEngine::new();

    let report = engine.classify(text);
    let raw = engine.assess(text);
    let assessment = normalize_assessment(&raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment).unwrap());
    } else if args.verbose {
        print_verbose_report(&report, &assessment, args.no_color);
    } else {
        print_assessment(&assessment, args.no_color);
    }
}

/// Prints the companion's read-aloud lines in place of speech output
struct TerminalNarrator {
    no_color: bool,
}

impl Narrator for TerminalNarrator {
    fn narrate(&self, text: &str) {
        if self.no_color {
            println!("  [aloud] {}", text);
        } else {
            println!("\x1b[90m  🔊 {}\x1b[0m", text);
        }
    }
}

/// Run interactive companion session
async fn run_interactive(args: &Args) {
    let store = OfflineStore::new(&args.store_dir);
    let answers = store.load_answers().unwrap_or_default();
    let checked = store.load_checklist().unwrap_or_default();
    let mut checklist = SafetyChecklist::with_checked(checked);
    let provider = TriageProvider::new();

    // Generate session ID
    let session_id = {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("session_{:x}", nanos as u64)
    };
    let mut session = CrisisSession::with_offline_answers(session_id, answers);
    if args.speak {
        session.set_narrator(Box::new(TerminalNarrator {
            no_color: args.no_color,
        }));
    }

    print_header("Companion Mode", args.no_color);
    println!("Tell me what's happening and I'll walk you through it.");
    println!("Type /help for commands, /presets for quick starts, 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let prompt = format_prompt(&session, args.no_color);
        print!("{}", prompt);
        stdout.flush().unwrap();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nTake care of yourself. Turns: {}", session.transcript().len());
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            handle_command(command, &mut session, &mut checklist, &store, &provider, args).await;
            continue;
        }

        // In offline mode a bare number answers the current question
        if session.offline_active() {
            if let Ok(choice) = line.parse::<usize>() {
                answer_by_number(&mut session, &store, choice, args.no_color);
                continue;
            }
        }

        send_and_render(&mut session, &provider, line, args).await;
    }
}

/// Dispatch one slash command
async fn handle_command(
    command: &str,
    session: &mut CrisisSession,
    checklist: &mut SafetyChecklist,
    store: &OfflineStore,
    provider: &TriageProvider,
    args: &Args,
) {
    let mut parts = command.splitn(2, ' ');
    let verb = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match verb {
        "help" => print_help(),
        "presets" => {
            for (i, preset) in QUICK_PRESETS.iter().enumerate() {
                println!("  {}. {}", i + 1, preset);
            }
            println!("Send one with: /preset <number>");
        }
        "preset" => match rest.parse::<usize>() {
            Ok(n) if (1..=QUICK_PRESETS.len()).contains(&n) => {
                let text = QUICK_PRESETS[n - 1];
                println!("> {}", text);
                send_and_render(session, provider, text, args).await;
            }
            _ => println!("Pick a preset 1-{}. See /presets.", QUICK_PRESETS.len()),
        },
        "tutorial" => match session.start_tutorial() {
            Ok(events) => {
                render_events(&events, args.no_color);
                render_walk(session, args.no_color);
                run_step_countdown(session, args.no_color);
            }
            Err(err) => print_session_error(&err, args.no_color),
        },
        "next" => {
            if session.offline_active() {
                session.offline_next();
                render_offline(session, args.no_color);
            } else {
                match session.advance_step() {
                    Ok(events) => {
                        render_events(&events, args.no_color);
                        render_walk(session, args.no_color);
                        run_step_countdown(session, args.no_color);
                    }
                    Err(err) => print_session_error(&err, args.no_color),
                }
            }
        }
        "back" => {
            if session.offline_active() {
                session.offline_back();
                render_offline(session, args.no_color);
            } else {
                println!("Nothing to go back to here.");
            }
        }
        "done" => match session.finish_tutorial() {
            Ok(events) => render_events(&events, args.no_color),
            Err(err) => print_session_error(&err, args.no_color),
        },
        "escalate" => match session.escalate() {
            Ok(events) => render_events(&events, args.no_color),
            Err(err) => print_session_error(&err, args.no_color),
        },
        "breathe" => {
            let key = if rest.is_empty() { "box" } else { rest };
            match session.start_breathing(key) {
                Ok(events) => {
                    render_events(&events, args.no_color);
                    run_breathing_laps(session, args.laps, args.no_color);
                }
                Err(err) => print_session_error(&err, args.no_color),
            }
        }
        "pause" => match session.pause_breathing() {
            Ok(()) => println!("Breathing paused. /resume picks up where you left off."),
            Err(err) => print_session_error(&err, args.no_color),
        },
        "resume" => match session.resume_breathing() {
            Ok(()) => run_breathing_laps(session, args.laps, args.no_color),
            Err(err) => print_session_error(&err, args.no_color),
        },
        "offline" => {
            let before = session.transcript().len();
            let events = session.on_connectivity(LinkState::Offline);
            render_new_turns(session, before, args.no_color);
            render_events(&events, args.no_color);
            render_offline(session, args.no_color);
        }
        "online" => {
            let before = session.transcript().len();
            let events = session.on_connectivity(LinkState::Online);
            render_new_turns(session, before, args.no_color);
            render_events(&events, args.no_color);
        }
        "category" => {
            session.select_offline_category(rest);
            render_offline(session, args.no_color);
        }
        "checklist" => render_checklist(checklist),
        "toggle" => match rest.parse::<usize>() {
            Ok(n) => {
                let items: Vec<String> = checklist
                    .sections()
                    .iter()
                    .flat_map(|s| s.items.iter().map(|i| i.to_string()))
                    .collect();
                match n.checked_sub(1).and_then(|i| items.get(i)) {
                    Some(item) => {
                        checklist.toggle(item);
                        if let Err(err) = store.save_checklist(checklist.checked_map()) {
                            eprintln!("Checklist not saved: {}", err);
                        }
                        render_checklist(checklist);
                    }
                    None => println!("Pick an item 1-{}.", items.len()),
                }
            }
            Err(_) => println!("Usage: /toggle <number> (see /checklist)"),
        },
        "status" => print_status(session, args.no_color),
        _ => println!("Unknown command '/{}'. Try /help.", verb),
    }
}

/// Send one message and render everything that came back
async fn send_and_render(
    session: &mut CrisisSession,
    provider: &TriageProvider,
    text: &str,
    args: &Args,
) {
    let before = session.transcript().len();
    match session.send_message(text, provider).await {
        Ok(events) => {
            // Skip the echo of the user's own turn
            render_new_turns(session, before + 1, args.no_color);
            render_events(&events, args.no_color);
            if !session.is_degraded() {
                if let Some(assessment) = session.assessment() {
                    if args.json {
                        println!("{}", serde_json::to_string(assessment).unwrap());
                    } else {
                        print_assessment(assessment, args.no_color);
                        println!("  /tutorial walks you through the steps.");
                    }
                }
            }
        }
        Err(err) => print_session_error(&err, args.no_color),
    }
}

/// Answer the current offline question by option number
fn answer_by_number(
    session: &mut CrisisSession,
    store: &OfflineStore,
    choice: usize,
    no_color: bool,
) {
    let option = session
        .offline()
        .current_question()
        .and_then(|q| choice.checked_sub(1).and_then(|i| q.options.get(i)))
        .cloned();

    match option {
        Some(option) => {
            let events = session.answer_offline(&option);
            if let Err(err) = store.save_answers(session.offline().answers()) {
                eprintln!("Answers not saved: {}", err);
            }
            render_events(&events, no_color);
            println!("Recorded: {}. /next to continue, /back to revisit.", option);
        }
        None => println!("Pick one of the numbered options."),
    }
}

/// Drive the pacing timer inline until the current step is done
fn run_step_countdown(session: &mut CrisisSession, no_color: bool) {
    let running = session
        .tutorial()
        .map(|t| t.phase() == TutorialPhase::TimerRunning)
        .unwrap_or(false);
    if !running {
        return;
    }

    let mut stdout = io::stdout();
    loop {
        let remaining = session.tutorial().map(|t| t.remaining_seconds()).unwrap_or(0);
        if no_color {
            print!("\r  {}s remaining  ", remaining);
        } else {
            print!("\r  \x1b[33m⏱  {}s remaining\x1b[0m  ", remaining);
        }
        stdout.flush().unwrap();

        std::thread::sleep(Duration::from_secs(1));
        let events = session.tick();
        let done = events
            .iter()
            .any(|e| matches!(e, FlowEvent::StepReady { .. }));
        if done {
            println!();
            println!("  Time's up for this step. /next when you're ready.");
            break;
        }
        let still_running = session
            .tutorial()
            .map(|t| t.phase() == TutorialPhase::TimerRunning)
            .unwrap_or(false);
        if !still_running {
            println!();
            break;
        }
    }
}

/// Run whole breathing laps inline, then hand the timer back
fn run_breathing_laps(session: &mut CrisisSession, laps: u32, no_color: bool) {
    let start_cycles = session
        .breathing()
        .map(|c| c.cycles_completed())
        .unwrap_or(0);

    if let Some(cycler) = session.breathing() {
        if let Some(phase) = cycler.phase() {
            print_breath_phase(phase.label(), cycler.remaining_seconds(), phase.color_code(), no_color);
        }
    }

    let mut stdout = io::stdout();
    loop {
        std::thread::sleep(Duration::from_secs(1));
        let events = session.tick();
        for event in &events {
            match event {
                FlowEvent::CyclePhaseChanged { phase, seconds } => {
                    println!();
                    print_breath_phase(phase.label(), *seconds, phase.color_code(), no_color);
                }
                FlowEvent::CycleCompleted { cycles } => {
                    println!();
                    println!("  Lap {} complete.", cycles);
                }
                _ => {}
            }
        }
        if events.is_empty() {
            let remaining = session
                .breathing()
                .map(|c| c.remaining_seconds())
                .unwrap_or(0);
            print!("\r  {}s  ", remaining);
            stdout.flush().unwrap();
        }

        let cycles = session
            .breathing()
            .map(|c| c.cycles_completed())
            .unwrap_or(0);
        if cycles >= start_cycles + laps {
            break;
        }
    }

    if session.pause_breathing().is_ok() {
        println!();
        println!("  Nice work. /resume for more laps.");
    }
}

fn print_breath_phase(label: &str, seconds: u32, color: &str, no_color: bool) {
    if no_color {
        print!("  {} ({}s)  ", label, seconds);
    } else {
        print!("  {}{} ({}s)\x1b[0m  ", color, label, seconds);
    }
    io::stdout().flush().unwrap();
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  CalmPath v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("\x1b[1m╔═════════════════════════════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║           CalmPath v{} - {}                      ║\x1b[0m", VERSION, mode);
        println!("\x1b[1m╚═════════════════════════════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

/// Format the session prompt from urgency and connectivity
fn format_prompt(session: &CrisisSession, no_color: bool) -> String {
    if session.offline_active() {
        return if no_color {
            "[OFFLINE] > ".to_string()
        } else {
            "\x1b[90m📴 [OFFLINE]\x1b[0m > ".to_string()
        };
    }

    let level = session.panic_level();
    if no_color {
        format!("[{}] > ", level)
    } else {
        format!(
            "{}{} [{}]\x1b[0m > ",
            level.color_code(),
            level.emoji(),
            level
        )
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /presets            Quick-start messages; /preset <n> sends one");
    println!("  /tutorial           Start the step-by-step walk");
    println!("  /next               Next step (or next offline question)");
    println!("  /back               Previous offline question");
    println!("  /done               Finish the walk: situation under control");
    println!("  /escalate           Get emergency contacts now");
    println!("  /breathe [pattern]  Breathing exercise: box | 478 | quick");
    println!("  /pause, /resume     Control a running breathing exercise");
    println!("  /offline, /online   Simulate a connectivity change");
    println!("  /category <name>    Pick an offline question category");
    println!("  /checklist          Preparedness checklist; /toggle <n> ticks one");
    println!("  /status             Session state at a glance");
    println!("  quit                End the session");
}

/// Render companion turns added after `from`
fn render_new_turns(session: &CrisisSession, from: usize, no_color: bool) {
    for turn in session.transcript().turns().skip(from) {
        if turn.speaker != Speaker::Companion {
            continue;
        }
        if no_color {
            println!("{}", turn.text);
        } else {
            println!("\x1b[36m{}\x1b[0m", turn.text);
        }
    }
}

/// Render flow events worth telling the user about
fn render_events(events: &[FlowEvent], no_color: bool) {
    for event in events {
        match event {
            FlowEvent::EscalationRequested { contacts } => {
                let (red, reset) = if no_color { ("", "") } else { ("\x1b[31m", "\x1b[0m") };
                println!("{}🚨 Call now:{}", red, reset);
                for contact in contacts {
                    println!("{}   {}{}", red, contact, reset);
                }
            }
            FlowEvent::TutorialCompleted => {
                println!("🎉 Every step done.");
            }
            FlowEvent::AnswerRecorded { key, option } => {
                if no_color {
                    println!("  saved {} = {}", key, option);
                } else {
                    println!("\x1b[90m  saved {} = {}\x1b[0m", key, option);
                }
            }
            _ => {}
        }
    }
}

/// Render the current walk position
fn render_walk(session: &CrisisSession, no_color: bool) {
    let Some(walk) = session.tutorial() else {
        return;
    };
    let phase = walk.phase();

    match phase {
        TutorialPhase::EscalationPrompt => {
            println!("🚑 Is the situation under control? /done if yes, /escalate for help.");
            return;
        }
        TutorialPhase::Completed | TutorialPhase::Escalated => return,
        _ => {}
    }

    let Some(step) = walk.current_step() else {
        return;
    };

    let marker = if step.critical {
        if no_color { " [IMPORTANT]" } else { " \x1b[31m[IMPORTANT]\x1b[0m" }
    } else {
        ""
    };

    if let Some(ref title) = step.title {
        println!("📋 Step {}/{}: {}{}", walk.step_index() + 1, walk.len(), title, marker);
        println!("   {}", step.instruction);
    } else {
        println!(
            "📋 Step {}/{}:{} {}",
            walk.step_index() + 1,
            walk.len(),
            marker,
            step.instruction
        );
    }
}

/// Render the offline question walk
fn render_offline(session: &CrisisSession, no_color: bool) {
    let nav = session.offline();

    let Some(section) = nav.active_section() else {
        println!("Pick a category with /category <name>:");
        for section in nav.sections() {
            println!("  {} - {}", section.label, section.description);
        }
        return;
    };

    let Some(question) = nav.current_question() else {
        return;
    };

    println!(
        "📴 {} ({}/{})",
        section.label,
        nav.question_index() + 1,
        section.len()
    );
    println!("   {}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        let picked = nav.selected_answer().map(|s| s == option).unwrap_or(false);
        let mark = if picked { "●" } else { " " };
        if no_color {
            println!("   {} {}. {}", mark, i + 1, option);
        } else if picked {
            println!("   \x1b[32m{} {}. {}\x1b[0m", mark, i + 1, option);
        } else {
            println!("   {} {}. {}", mark, i + 1, option);
        }
    }
    println!("   Answer with a number. /next, /back, /category <name>.");
}

/// Render the checklist with global item numbers
fn render_checklist(checklist: &SafetyChecklist) {
    let mut n = 0;
    for section in checklist.sections() {
        println!("{} {}", section.emoji, section.label);
        for item in section.items {
            n += 1;
            let mark = if checklist.is_checked(item) { "x" } else { " " };
            println!("  [{}] {:2}. {}", mark, n, item);
        }
    }
    let (done, total) = checklist.progress();
    println!("{}/{} prepared", done, total);
}

/// Print one-line session status
fn print_status(session: &CrisisSession, no_color: bool) {
    let level = session.panic_level();
    let (color, reset) = if no_color {
        ("", "")
    } else {
        (level.color_code(), "\x1b[0m")
    };
    println!(
        "{}{} {} | link={} | degraded={} | timer={:?} | turns={}{}",
        color,
        level.emoji(),
        level,
        session.link_state(),
        session.is_degraded(),
        session.timer_owner(),
        session.transcript().len(),
        reset
    );
    if let Some(walk) = session.tutorial() {
        println!(
            "  walk: {} step {}/{}",
            walk.phase(),
            walk.step_index() + 1,
            walk.len()
        );
    }
    if let Some(cycler) = session.breathing() {
        println!(
            "  breathing: {} lap {} ({} done)",
            cycler.pattern().name,
            cycler.current_cycle(),
            cycler.cycles_completed()
        );
    }
}

fn print_session_error(err: &SessionError, no_color: bool) {
    let (yellow, reset) = if no_color { ("", "") } else { ("\x1b[33m", "\x1b[0m") };
    match err {
        SessionError::RequestOutstanding => {
            println!("{}⚠  Still working on your last message. One moment.{}", yellow, reset);
        }
        SessionError::NoAssessment => {
            println!("{}⚠  Tell me what's happening first, then /tutorial.{}", yellow, reset);
        }
        SessionError::NoTutorial => {
            println!("{}⚠  No walk in progress. /tutorial starts one.{}", yellow, reset);
        }
        SessionError::NoBreathing => {
            println!("{}⚠  No breathing exercise running. /breathe starts one.{}", yellow, reset);
        }
        SessionError::UnknownPattern(key) => {
            println!("{}⚠  Unknown pattern '{}'. Try box, 478 or quick.{}", yellow, reset, key);
        }
    }
}

/// Print compact assessment summary
fn print_assessment(assessment: &Assessment, no_color: bool) {
    let severity = assessment.severity;
    let (color, reset) = if no_color {
        ("", "")
    } else {
        (severity.color_code(), Severity::color_reset())
    };

    println!(
        "{}{} {} | severity={} | {} steps{}",
        color,
        assessment.crisis_type.emoji(),
        assessment.crisis_type.label(),
        severity,
        assessment.steps.len(),
        reset
    );
    if assessment.escalation.required {
        let (red, r2) = if no_color { ("", "") } else { ("\x1b[31m", "\x1b[0m") };
        println!("{}🚨 Get outside help now:{}", red, r2);
        for contact in &assessment.escalation.contacts {
            println!("{}   {}{}", red, contact, r2);
        }
    }
    if no_color {
        println!("  {}", assessment.reassurance);
    } else {
        println!("\x1b[90m  {}\x1b[0m", assessment.reassurance);
    }
}

/// Print verbose cue breakdown
fn print_verbose_report(report: &TriageReport, assessment: &Assessment, no_color: bool) {
    let severity = report.severity;
    let color = if no_color { "" } else { severity.color_code() };
    let reset = if no_color { "" } else { Severity::color_reset() };

    println!("{}┌───────────────────────────────────────┐{}", color, reset);
    println!("{}│ score = {:.2}  ({} words){}",
        color, report.score, report.word_count, reset);
    println!("{}├───────────────────────────────────────┤{}", color, reset);
    println!("{}│ Cues:{}                          ", color, reset);
    println!("{}│   life_threat:   {:.0} (w=3.2){}", color, report.cues.life_threat, reset);
    println!("{}│   active_danger: {:.0} (w=2.4){}", color, report.cues.active_danger, reset);
    println!("{}│   injury:        {:.0} (w=1.6){}", color, report.cues.injury, reset);
    println!("{}│   distress:      {:.0} (w=0.8){}", color, report.cues.distress, reset);
    println!("{}│   urgency:       {:.0} (w=0.6){}", color, report.cues.urgency, reset);
    println!("{}├───────────────────────────────────────┤{}", color, reset);
    println!("{}│ Type: {} | Severity: {}{}",
        color, report.kind.label(), severity, reset);
    println!("{}│ Steps: {} ({} timed, {} critical){}",
        color,
        assessment.steps.len(),
        assessment.timed_step_count(),
        assessment.critical_step_count(),
        reset);
    println!("{}└───────────────────────────────────────┘{}", color, reset);

    if assessment.escalation.required {
        for contact in &assessment.escalation.contacts {
            println!("  🚨 {}", contact);
        }
    }
}

/// Run a standalone breathing exercise (no session)
fn run_breathe(key: &str, args: &Args) {
    let Some(pattern) = BreathingPattern::by_key(key) else {
        eprintln!("Unknown pattern '{}'. Available:", key);
        for preset in BreathingPattern::presets() {
            eprintln!("  {} - {}", preset.name, preset.description);
        }
        std::process::exit(1);
    };

    print_header("Breathing", args.no_color);
    println!("{} - {}", pattern.name, pattern.description);
    println!("{} laps, {}s each. Follow along.", args.laps, pattern.lap_seconds());
    println!();

    let mut cycler = PhaseCycler::new(pattern);
    cycler.start();
    if let Some(phase) = cycler.phase() {
        print_breath_phase(phase.label(), cycler.remaining_seconds(), phase.color_code(), args.no_color);
    }

    let mut stdout = io::stdout();
    while cycler.cycles_completed() < args.laps {
        std::thread::sleep(Duration::from_secs(1));
        let events = cycler.tick();
        for event in &events {
            match event {
                FlowEvent::CyclePhaseChanged { phase, seconds } => {
                    println!();
                    print_breath_phase(phase.label(), *seconds, phase.color_code(), args.no_color);
                }
                FlowEvent::CycleCompleted { cycles } => {
                    println!();
                    println!("  Lap {} complete.", cycles);
                }
                _ => {}
            }
        }
        if events.is_empty() {
            print!("\r  {}s  ", cycler.remaining_seconds());
            stdout.flush().unwrap();
        }
    }

    println!();
    println!("Done. {} laps completed.", cycler.cycles_completed());
}

/// Run HTTP API server (Slice 5)
async fn run_serve(args: &Args) {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║  🧭 CalmPath API Server                                    ║");
    println!("║  Version: {}                                           ║", VERSION);
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = run_server(&args.addr, args.store_dir.clone()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
