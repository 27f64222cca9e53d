//! Producer and consumer on separate threads, driven through the sink
//! interface the parsers use.

use std::thread;
use std::time::{Duration, Instant};

use brook_graph_ir::{GraphName, Quad, StreamSink, Term, Triple};
use brook_stream::{PipeConfig, PipeError, PipedRdfIterator};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("brook_stream=debug")
        .with_test_writer()
        .try_init();
}

fn quad(i: usize) -> Quad {
    Quad::new(
        GraphName::Named(Term::iri(format!("http://example.org/g{}", i % 3))),
        Term::iri(format!("http://example.org/s{}", i)),
        Term::iri("http://example.org/p"),
        Term::typed(i.to_string(), "http://www.w3.org/2001/XMLSchema#integer"),
    )
}

#[test]
fn test_quads_arrive_in_submission_order() {
    init_tracing();
    let mut iter = PipedRdfIterator::<Quad>::new(PipeConfig::new().with_buffer_size(8));
    let mut stream = iter.connect().unwrap();

    let producer = thread::Builder::new()
        .name("producer".into())
        .spawn(move || -> Result<(), brook_graph_ir::SinkError> {
            stream.on_start()?;
            stream.on_prefix("ex", "http://example.org/")?;
            for i in 0..200 {
                stream.on_quad(quad(i))?;
                // Dropped by a quads-only stream
                stream.on_triple(quad(i).as_triple())?;
            }
            stream.on_finish()
        })
        .unwrap();

    let received: Vec<Quad> = iter.by_ref().collect::<Result<_, _>>().unwrap();
    producer.join().unwrap().unwrap();

    let expected: Vec<Quad> = (0..200).map(quad).collect();
    assert_eq!(received, expected);
    assert_eq!(
        iter.prefixes().get("ex").map(String::as_str),
        Some("http://example.org/")
    );
}

#[test]
fn test_termination_after_finish_does_not_block() {
    init_tracing();
    let mut iter = PipedRdfIterator::<Triple>::new(
        PipeConfig::new().with_poll_timeout(Duration::from_secs(30)),
    );
    let mut stream = iter.connect().unwrap();

    stream.start().unwrap();
    stream.receive(quad(1).as_triple()).unwrap();
    stream.finish().unwrap();

    let started = Instant::now();
    assert!(iter.has_next().unwrap());
    assert_eq!(iter.try_next().unwrap(), quad(1).as_triple());
    assert!(!iter.has_next().unwrap());
    assert!(!iter.has_next().unwrap());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_consumer_exit_fails_blocked_producer() {
    init_tracing();
    let iter = PipedRdfIterator::<Triple>::new(
        PipeConfig::new()
            .with_buffer_size(1)
            .with_poll_timeout(Duration::from_millis(20)),
    );
    let mut stream = iter.connect().unwrap();
    stream.start().unwrap();

    // The consumer reads one item on its own thread, then exits without
    // closing: the iterator is leaked so Drop never runs.
    stream.receive(quad(0).as_triple()).unwrap();
    let consumer = thread::spawn(move || {
        let mut iter = iter;
        let first = iter.try_next();
        std::mem::forget(iter);
        first
    });
    assert!(consumer.join().unwrap().is_ok());

    let err = stream.receive(quad(1).as_triple()).unwrap_err();
    assert_eq!(err, PipeError::ConsumerDead);
    assert!(err.is_liveness());
}
