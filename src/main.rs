use proofkernel::diag::StdoutSink;
use proofkernel::{process_path, State};

fn main() {
    let paths: Vec<String> = std::env::args().skip(1).collect();

    let mut state = State::new();
    let mut sink = StdoutSink;

    if paths.is_empty() {
        eprintln!("usage: proofkernel <file> [file...]");
        return;
    }

    for path in &paths {
        process_path(&mut state, path, &mut sink);
    }
}
