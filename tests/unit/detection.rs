//! Shuffle heuristic properties and reference scenarios

use crate::common::{shuffle_transaction, transaction, ONE_BTC};
use coinshuffle_scan::detection::{aggregate, classify, ShuffleClassifier};
use coinshuffle_scan::types::{Transaction, TxInput, TxOutput};

#[test]
fn test_histogram_counts_sum_to_output_count() {
    let outputs: Vec<TxOutput> = [0.1, 0.2, 0.1, 1.0, 0.30000000000000004, 0.3, 0.0]
        .iter()
        .map(|&value| TxOutput::new(value))
        .collect();

    let histogram = aggregate(&outputs);
    assert_eq!(histogram.total(), outputs.len());
    assert_eq!(histogram.iter().map(|(_, count)| count).sum::<usize>(), 7);
    // Float noise lands on the same satoshi
    assert_eq!(histogram.count(30_000_000), 2);
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn test_scenario_a_five_party_shuffle() {
    let mut outputs = vec![1.0; 5];
    outputs.extend([0.23, 0.45, 0.5999, 0.7, 1.1]);
    let tx = transaction("scenario-a", &[2 * ONE_BTC; 5], &outputs, 1396317700);

    let result = classify(&tx);
    assert!(result.is_match);
    assert_eq!(result.matched_amount, Some(100_000_000));
    assert_eq!(result.occurrence_count, 5);
    assert_eq!(result.participants_unable_to_spend, 0);
    assert!(result.is_valid());
}

#[test]
fn test_scenario_b_too_few_inputs() {
    let mut outputs = vec![1.0; 4];
    outputs.extend([0.1, 0.2, 0.3, 0.4]);
    let tx = transaction("scenario-b", &[2 * ONE_BTC; 4], &outputs, 0);

    let result = classify(&tx);
    assert!(!result.is_match);
    assert_eq!(result.matched_amount, None);
    assert_eq!(result.input_count, 4);
    assert_eq!(result.output_count, 8);
}

#[test]
fn test_scenario_c_wrong_shape() {
    let mut outputs = vec![1.0; 6];
    outputs.extend([0.1, 0.2, 0.3, 0.4, 0.5]);
    let tx = transaction("scenario-c", &[2 * ONE_BTC; 6], &outputs, 0);

    assert!(!classify(&tx).is_match);
}

#[test]
fn test_scenario_d_underfunded_participants() {
    let mut outputs = vec![0.5; 6];
    outputs.extend([0.01, 0.02, 0.03, 0.04, 0.05, 0.06]);
    let inputs = [
        ONE_BTC,
        ONE_BTC,
        10_000_000,
        ONE_BTC,
        49_999_999,
        ONE_BTC,
    ];
    let tx = transaction("scenario-d", &inputs, &outputs, 0);

    let result = classify(&tx);
    assert!(result.is_match);
    assert_eq!(result.matched_amount, Some(50_000_000));
    assert_eq!(result.participants_unable_to_spend, 2);
    assert!(!result.is_valid());
}

#[test]
fn test_synthetic_shuffles_match_for_any_size() {
    for participants in 5..=40 {
        let amount = 12_345_678 + participants as u64;
        let tx = shuffle_transaction("synthetic", participants, amount, amount * 2, 0);

        let result = classify(&tx);
        assert!(result.is_match, "{} participants", participants);
        assert_eq!(result.matched_amount, Some(amount));
        assert_eq!(result.occurrence_count, participants);
    }
}

#[test]
fn test_gates_reject_regardless_of_amounts() {
    for inputs in 0..5 {
        let tx = shuffle_transaction("small", inputs, ONE_BTC, ONE_BTC, 0);
        assert!(!classify(&tx).is_match);
    }

    let mut tx = shuffle_transaction("shape", 7, ONE_BTC, ONE_BTC, 0);
    tx.outputs.push(TxOutput::new(0.42));
    assert!(!classify(&tx).is_match);
}

#[test]
fn test_classify_is_deterministic() {
    let tx = shuffle_transaction("repeat", 9, 25_000_000, 30_000_000, 1_400_000_000);
    let first = classify(&tx);
    for _ in 0..10 {
        assert_eq!(classify(&tx), first);
    }
}

#[test]
fn test_unresolved_inputs_are_reported_separately() {
    let mut tx = shuffle_transaction("partial", 5, ONE_BTC, 2 * ONE_BTC, 0);
    tx.inputs[0] = TxInput::unresolved("funding", 0);
    tx.inputs[1] = TxInput::unresolved("funding", 1);

    let result = classify(&tx);
    assert!(result.is_match);
    assert_eq!(result.participants_unable_to_spend, 0);
    assert_eq!(result.unresolved_inputs, 2);
    assert!(!result.is_valid());
}

#[test]
fn test_custom_participant_threshold() {
    let tx = shuffle_transaction("three", 3, ONE_BTC, ONE_BTC, 0);
    assert!(!classify(&tx).is_match);
    assert!(ShuffleClassifier::new(3).classify(&tx).is_match);
}

#[test]
fn test_no_repeated_amount_is_no_match() {
    let outputs: Vec<f64> = (1..=10).map(|i| i as f64 * 0.01).collect();
    let tx = Transaction {
        txid: "distinct".to_string(),
        inputs: (0..5).map(|i| TxInput::resolved("funding", i, ONE_BTC)).collect(),
        outputs: outputs.into_iter().map(TxOutput::new).collect(),
        block_time: 0,
    };
    assert!(!classify(&tx).is_match);
}
