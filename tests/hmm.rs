//!
//! test of hmm
//!
#[macro_use]
extern crate approx;

use profhmm::alphabet::Alphabet;
use profhmm::error::Error;
use profhmm::hmm::mocks::{mock_branching, mock_linear};
use profhmm::hmm::{Hmm, Path, Step};
use profhmm::prob::{p, Prob};
use profhmm::state::State;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

#[test]
fn linear_chain_likelihood() {
    let (hmm, ids) = mock_linear().unwrap();
    let path: Path = vec![
        Step::new(ids.start, 0),
        Step::new(ids.m1, 1),
        Step::new(ids.m2, 1),
        Step::new(ids.end, 0),
    ]
    .into_iter()
    .collect();
    assert_abs_diff_eq!(hmm.likelihood(b"AC", &path).unwrap(), p(0.3), epsilon = 1e-12);
    assert!(hmm.likelihood(b"AG", &path).unwrap().is_zero());
    assert!(matches!(
        hmm.likelihood(b"A", &path),
        Err(Error::SequenceLengthMismatch { .. })
    ));
}

#[test]
fn branching_viterbi() {
    let (hmm, ids) = mock_branching().unwrap();

    let (score, path) = hmm.viterbi(b"AC", ids.end).unwrap();
    assert_abs_diff_eq!(score, p(0.3072), epsilon = 1e-12);
    let states: Vec<_> = path.iter().map(|s| s.state).collect();
    assert_eq!(states, vec![ids.start, ids.m1, ids.m2, ids.end]);

    let (score, _) = hmm.viterbi(b"A", ids.end).unwrap();
    assert_abs_diff_eq!(score, p(0.128), epsilon = 1e-12);

    assert!(matches!(hmm.viterbi(b"GG", ids.end), Err(Error::NoPath(_))));
}

#[test]
fn random_sequences_score_their_best_path() {
    let (hmm, ids) = mock_branching().unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    for _ in 0..50 {
        let n = rng.gen_range(0..=2);
        let seq: Vec<u8> = (0..n).map(|_| *b"AC".choose(&mut rng).unwrap()).collect();
        let (score, path) = hmm.viterbi(&seq, ids.end).unwrap();
        let lik = hmm.likelihood(&seq, &path).unwrap();
        assert_abs_diff_eq!(score, lik, epsilon = 1e-12);
        assert_eq!(path.seq_len(), seq.len());
    }
}

///
/// Table state emitting words of different lengths between two mute states
///
#[test]
fn table_state_chooses_segmentation() {
    let abc = Alphabet::dna();
    let mut hmm = Hmm::new("words");
    let s = hmm.add_state(State::mute("S", abc.clone()), Prob::one()).unwrap();
    let w = hmm
        .add_state(
            State::table(
                "W",
                abc.clone(),
                vec![
                    (b"A".to_vec(), p(0.2)),
                    (b"AC".to_vec(), p(0.5)),
                    (b"ACG".to_vec(), p(0.3)),
                ],
            )
            .unwrap(),
            Prob::zero(),
        )
        .unwrap();
    let e = hmm.add_state(State::mute("E", abc), Prob::zero()).unwrap();
    hmm.set_transition(s, w, p(1.0)).unwrap();
    hmm.set_transition(w, w, p(0.5)).unwrap();
    hmm.set_transition(w, e, p(0.5)).unwrap();

    // G alone is not a word
    let (score, path) = hmm.viterbi(b"ACG", e).unwrap();
    assert_abs_diff_eq!(score, p(0.15), epsilon = 1e-12);
    assert_eq!(path.len(), 3);
    assert_eq!(path[1], Step::new(w, 3));

    // ACA: AC then A
    let (score, path) = hmm.viterbi(b"ACA", e).unwrap();
    assert_abs_diff_eq!(score, p(0.5 * 0.5 * 0.2 * 0.5), epsilon = 1e-12);
    let lens: Vec<usize> = path.iter().map(|s| s.seq_len).collect();
    assert_eq!(lens, vec![0, 2, 1, 0]);

    // windows longer than 2 are not allowed
    assert!(matches!(
        hmm.viterbi_with_window(b"ACG", e, Some(2)),
        Err(Error::NoPath(_))
    ));
}
