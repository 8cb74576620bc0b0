use secucode_puf::code::constants::{FIELD_DEGREE, GENERATOR, PRIMITIVE_POLY};
use secucode_puf::{BchCode, CyclotomicCosets, FuzzyError, GaloisField, GeneratorPolynomial};
use test_case::test_case;

fn device_field() -> GaloisField {
    GaloisField::build(PRIMITIVE_POLY, FIELD_DEGREE).expect("x^5 + x^2 + 1 is primitive")
}

#[test]
fn synthesized_generator_matches_device_constant() {
    let generator = GeneratorPolynomial::synthesize(&device_field(), 31, 3).unwrap();
    assert_eq!(generator.coefficients(), &GENERATOR[..]);
    assert_eq!(generator.redundancy(), 15);
    assert_eq!(generator.dimension(), 16);
    assert_eq!(generator.designed_distance(), 7);
    assert_eq!(generator.zeros().len(), 15);

    let code = BchCode::synthesized().unwrap();
    assert_eq!(code.generator(), &GENERATOR);
}

#[test]
fn cosets_modulo_31() {
    let cosets: Vec<Vec<usize>> = CyclotomicCosets::modulo(31)
        .iter()
        .map(<[usize]>::to_vec)
        .collect();
    assert_eq!(
        cosets,
        vec![
            vec![1, 2, 4, 8, 16],
            vec![3, 6, 12, 24, 17],
            vec![5, 10, 20, 9, 18],
            vec![7, 14, 28, 25, 19],
            vec![11, 22, 13, 26, 21],
            vec![15, 30, 29, 27, 23],
        ]
    );
}

#[test]
fn field_tables_are_inverse() {
    let field = device_field();
    for bits in 1..32u16 {
        let x = secucode_puf::PolyForm::new(bits);
        let log = field.log(x).expect("nonzero element has a log");
        assert_eq!(field.exp(log), x);
    }
    assert_eq!(field.log(secucode_puf::PolyForm::ZERO), None);
}

#[test_case(0b10011, 4, 15, 2, &[1, 0, 0, 0, 1, 0, 1, 1, 1] ; "bch_15_7_2")]
#[test_case(0b100101, 5, 31, 1, &[1, 0, 1, 0, 0, 1] ; "hamming_31_26")]
fn smaller_codes(poly: u32, degree: u32, length: usize, t: usize, expected: &[u8]) {
    let field = GaloisField::build(poly, degree).unwrap();
    let generator = GeneratorPolynomial::synthesize(&field, length, t).unwrap();
    assert_eq!(generator.coefficients(), expected);
}

#[test_case(20, 5 ; "redundancy equals length")]
#[test_case(16, 15 ; "every coset is a zero")]
#[test_case(31, 0 ; "no correction")]
fn infeasible_parameters(length: usize, t: usize) {
    let err = GeneratorPolynomial::synthesize(&device_field(), length, t).unwrap_err();
    assert!(
        matches!(err, FuzzyError::InfeasibleCodeParameters { .. }),
        "got {err:?}"
    );
}

#[test_case(15 ; "below half the field")]
#[test_case(32 ; "longer than the field")]
fn invalid_lengths(length: usize) {
    let err = GeneratorPolynomial::synthesize(&device_field(), length, 1).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidCodeLength { min: 16, max: 31, .. }));
}

#[test_case(0b11111, 4 ; "order five polynomial")]
#[test_case(0b10101, 4 ; "reducible polynomial")]
#[test_case(0b1001, 4 ; "wrong degree")]
fn non_primitive_polynomials(poly: u32, degree: u32) {
    assert!(matches!(
        GaloisField::build(poly, degree),
        Err(FuzzyError::NotPrimitive { .. })
    ));
}

#[test_case(1)]
#[test_case(17)]
fn unsupported_degrees(degree: u32) {
    assert!(matches!(
        GaloisField::build((1 << degree) | 1, degree),
        Err(FuzzyError::UnsupportedFieldDegree { .. })
    ));
}
