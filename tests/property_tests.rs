//! Property tests for the buffered stream invariants.

use bufio::{BufferedStream, MemorySource, Separator, StreamConfig};
use quickcheck_macros::quickcheck;

const SEPARATORS: [&str; 4] = ["\n", ";", "\r\n", "ab"];

fn stream(data: &[u8], chunk: u8, max_read: u8) -> BufferedStream<MemorySource> {
    let cfg = StreamConfig::default().with_chunk_size(chunk as usize % 16 + 1);
    let mut src = MemorySource::new(data);
    if max_read > 0 {
        src = src.with_max_read(max_read as usize % 8 + 1);
    }
    BufferedStream::new(src, cfg).expect("valid config")
}

#[quickcheck]
fn read_then_pushback_restores_state(data: Vec<u8>, skip: usize, n: usize, chunk: u8) -> bool {
    let mut io = stream(&data, chunk, 0);
    let skip = skip % (data.len() + 1);
    io.read_bytes(skip).unwrap();

    let before = io.pos().unwrap();
    let n = n % (data.len() + 2);
    if let Some(got) = io.read_bytes(n).unwrap() {
        io.pushback(&got).unwrap();
    }
    io.pos().unwrap() == before && io.read_all().unwrap() == data[skip..]
}

#[quickcheck]
fn eof_probe_is_idempotent(data: Vec<u8>, probes: u8, chunk: u8, max_read: u8) -> bool {
    let mut io = stream(&data, chunk, max_read);
    let first = io.is_eof().unwrap();
    let stable = (0..probes % 5).all(|_| io.is_eof().unwrap() == first);
    stable && first == data.is_empty() && io.pos().unwrap() == 0 && io.read_all().unwrap() == data
}

#[quickcheck]
fn lines_reconstitute_input(data: Vec<u8>, which: u8, chunk: u8, max_read: u8) -> bool {
    let sep = SEPARATORS[which as usize % SEPARATORS.len()];
    let mut io = stream(&data, chunk, max_read);
    let lines: Vec<Vec<u8>> = io
        .lines_with(Separator::from(sep), None)
        .collect::<bufio::Result<_>>()
        .unwrap();

    let all_but_last_end_with_sep = lines
        .iter()
        .rev()
        .skip(1)
        .all(|l| l.ends_with(sep.as_bytes()));
    lines.concat() == data && all_but_last_end_with_sep && lines.iter().all(|l| !l.is_empty())
}

#[quickcheck]
fn limit_caps_every_line(data: Vec<u8>, limit: u8, chunk: u8) -> bool {
    let limit = limit as usize % 10 + 1;
    let mut io = stream(&data, chunk, 0);
    let lines: Vec<Vec<u8>> = io
        .lines_with(Separator::from("\n"), Some(limit))
        .collect::<bufio::Result<_>>()
        .unwrap();
    lines.iter().all(|l| l.len() <= limit) && lines.concat() == data
}

#[quickcheck]
fn paragraphs_reconstitute_input(data: Vec<u8>, chunk: u8, max_read: u8) -> bool {
    let mut io = stream(&data, chunk, max_read);
    let paras: Vec<Vec<u8>> = io
        .lines_with(Separator::Paragraph, None)
        .collect::<bufio::Result<_>>()
        .unwrap();
    paras.concat() == data
}

#[quickcheck]
fn chunking_does_not_change_lines(data: Vec<u8>, chunk: u8, max_read: u8) -> bool {
    let mut reference = BufferedStream::with_defaults(MemorySource::new(data.clone()));
    let expected = reference.read_lines().unwrap();
    let mut io = stream(&data, chunk, max_read);
    io.read_lines().unwrap() == expected
}

#[test]
fn paragraph_example_yields_two_records() {
    let mut io = BufferedStream::with_defaults(MemorySource::new("AAA\nBBB\n\nCCC\n"));
    assert_eq!(
        io.gets_with(&Separator::Paragraph, None).unwrap().unwrap(),
        b"AAA\nBBB\n\n"
    );
    assert_eq!(
        io.gets_with(&Separator::Paragraph, None).unwrap().unwrap(),
        b"CCC\n"
    );
    assert_eq!(io.gets_with(&Separator::Paragraph, None).unwrap(), None);
}
