mod common;

use common::{assembler, flip, golden_record, GOLDEN_HELPER, GOLDEN_KEY, GOLDEN_RESPONSE};
use secucode_puf::{BlockStatus, FuzzyError, HelperData, NoPacing, RecordedPuf};

#[test]
fn golden_record_reconstructs_golden_key() {
    let rebuilt = assembler()
        .reconstruct(&golden_record(), &GOLDEN_HELPER)
        .expect("golden inputs are well formed");

    assert_eq!(rebuilt.statuses(), &[BlockStatus::Clean; 8]);
    assert_eq!(rebuilt.total_errors(), 0);
    let key = rebuilt.into_verified_key().expect("every block verifies");
    assert_eq!(key.as_bytes(), GOLDEN_KEY);
}

#[test]
fn golden_response_enrolls_to_golden_helper() {
    let enrollment = assembler().enroll(&GOLDEN_RESPONSE).unwrap();
    assert_eq!(enrollment.helper().as_bytes(), &GOLDEN_HELPER);
    assert_eq!(enrollment.key().as_bytes(), GOLDEN_KEY);
    assert_eq!(
        enrollment.helper().to_string(),
        "3A 32 55 EE BB 96 B2 F2 91 D0 14 32 CD C2 2E F8"
    );
}

#[test]
fn key_is_concatenation_of_block_segments() {
    let mut record = golden_record();
    flip(&mut record, 1, &[4]);
    flip(&mut record, 3, &[0, 9, 20]);
    flip(&mut record, 7, &[15, 16]);

    let assembler = assembler();
    let helper = HelperData::from_bytes(GOLDEN_HELPER);
    let outcomes = assembler
        .decode_blocks(&record, &helper, &mut NoPacing)
        .unwrap();
    let concatenated: Vec<u8> = outcomes.iter().flat_map(|o| o.segment()).collect();

    let rebuilt = assembler.reconstruct(&record, &GOLDEN_HELPER).unwrap();
    assert_eq!(&rebuilt.key().as_bytes()[..], &concatenated[..]);
    assert_eq!(rebuilt.total_errors(), 6);
    assert_eq!(rebuilt.statuses()[3], BlockStatus::Corrected(3));
}

#[test]
fn malformed_helper_is_rejected() {
    for len in [0, 15, 17, 32] {
        let helper = vec![0u8; len];
        let err = assembler()
            .reconstruct(&golden_record(), &helper)
            .unwrap_err();
        assert!(
            matches!(err, FuzzyError::MalformedHelperData { expected: 16, actual } if actual == len),
            "len {len}: {err:?}"
        );
    }
}

#[test]
fn short_readings_are_rejected() {
    let record = golden_record();
    let err = assembler()
        .reconstruct(&record[..200], &GOLDEN_HELPER)
        .unwrap_err();
    assert!(matches!(err, FuzzyError::ShortReading { needed: 256, actual: 200 }));

    let err = assembler().enroll(&GOLDEN_RESPONSE[..20]).unwrap_err();
    assert!(matches!(err, FuzzyError::ShortReading { needed: 32, actual: 20 }));
}

#[test]
fn longer_inputs_use_leading_bytes() {
    let mut response = GOLDEN_RESPONSE.to_vec();
    response.extend_from_slice(&[0xFF; 8]);
    let enrollment = assembler().enroll(&response).unwrap();
    assert_eq!(enrollment.helper().as_bytes(), &GOLDEN_HELPER);

    let mut record = golden_record();
    record.extend_from_slice(&[1; 44]);
    let rebuilt = assembler().reconstruct(&record, &GOLDEN_HELPER).unwrap();
    assert_eq!(rebuilt.key().as_bytes(), GOLDEN_KEY);
}

#[test]
fn nonzero_record_bytes_read_as_one() {
    let record: Vec<u8> = golden_record()
        .into_iter()
        .map(|bit| if bit != 0 { 0xFF } else { 0 })
        .collect();
    let rebuilt = assembler().reconstruct(&record, &GOLDEN_HELPER).unwrap();
    assert_eq!(rebuilt.total_errors(), 0);
    assert_eq!(rebuilt.key().as_bytes(), GOLDEN_KEY);
}

#[test]
fn pacer_runs_between_reconstruction_blocks() {
    let mut calls = Vec::new();
    let mut pacer = |completed: usize| calls.push(completed);
    assembler()
        .reconstruct_paced(&golden_record(), &GOLDEN_HELPER, &mut pacer)
        .unwrap();
    assert_eq!(calls, vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn recorded_puf_drives_enroll_and_reconstruct() {
    let mut puf = RecordedPuf::new().with_response(0, GOLDEN_RESPONSE);
    let assembler = assembler();

    let enrollment = assembler.enroll_from(&mut puf, 0).unwrap();
    assert_eq!(enrollment.helper().as_bytes(), &GOLDEN_HELPER);

    let rebuilt = assembler
        .reconstruct_from(&mut puf, 0, enrollment.helper().as_bytes())
        .unwrap();
    assert_eq!(rebuilt.key(), enrollment.key());

    let err = assembler.enroll_from(&mut puf, 9).unwrap_err();
    assert!(matches!(err, FuzzyError::Source(_)));
    assert!(err.to_string().contains("challenge 9"));
}
