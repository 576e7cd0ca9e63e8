use measr_core::parser::Term;
use measr_core::{parse_line, BinaryOp, MeasureError, Quantity};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn q(s: &str) -> Quantity {
    s.parse().unwrap()
}

#[test]
fn test_sigil_and_spacing_are_optional() {
    let expected = q("92-5/8in");
    for literal in ["#92-5/8in", "92+5/8in", "92-5/8 in", "  #92-5/8in  "] {
        assert_eq!(q(literal), expected, "{literal}");
    }
    assert_eq!(q("2.54 m"), q("2.54m"));
}

#[test]
fn test_signs() {
    assert_eq!(q("-3/8in").checked_neg().unwrap(), q("3/8in"));
    assert_eq!(q("-2-1/2ft").to_string(), "-2-1/2ft");
    assert!(q("-1.5kg").is_negative());
    assert!(q("-0m").is_zero());
}

#[test]
fn test_fractions_rejected_outside_customary_units() {
    for literal in ["1/2cm", "1-1/2kg", "1/2C", "3/4GB"] {
        assert!(
            matches!(literal.parse::<Quantity>(), Err(MeasureError::InvalidFractionSyntax(_))),
            "{literal}"
        );
    }
}

#[test]
fn test_malformed_fractions() {
    assert!(matches!("1/0in".parse::<Quantity>(), Err(MeasureError::InvalidFractionSyntax(_))));
    assert!(matches!(
        "1.5-1/2in".parse::<Quantity>(),
        Err(MeasureError::InvalidFractionSyntax(_))
    ));
    assert!(matches!("1/in".parse::<Quantity>(), Err(MeasureError::InvalidLiteral { .. })));
}

#[test]
fn test_unknown_suffix_suggests() {
    match "3 fet".parse::<Quantity>() {
        Err(MeasureError::UnknownUnitSuffix { suffix, suggestion }) => {
            assert_eq!(suffix, "fet");
            assert_eq!(suggestion, Some("ft"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_aliases() {
    assert_eq!(q("250ml"), q("250mL"));
    assert_eq!(q("1l"), q("1L"));
    assert_eq!(q("98.6°F"), q("98.6F"));
    assert_eq!(q("2cups"), q("2cup"));
}

#[test]
fn test_lines_with_every_operator() {
    for (text, op) in [
        ("1m + 2m", BinaryOp::Add),
        ("1m - 2m", BinaryOp::Subtract),
        ("1m * 2", BinaryOp::Multiply),
        ("1m / 2", BinaryOp::Divide),
        ("1m == 100cm", BinaryOp::Eq),
        ("1m != 100cm", BinaryOp::Ne),
        ("1m < 2m", BinaryOp::Lt),
        ("1m <= 2m", BinaryOp::Le),
        ("1m > 2m", BinaryOp::Gt),
        ("1m >= 2m", BinaryOp::Ge),
    ] {
        let line = parse_line(text).unwrap();
        assert_eq!(line.operation.map(|(op, _)| op), Some(op), "{text}");
    }
}

#[test]
fn test_mixed_number_is_not_subtraction() {
    let line = parse_line("5-1/2in").unwrap();
    assert!(line.operation.is_none());

    let line = parse_line("5in - 1/2in").unwrap();
    assert_eq!(line.operation.as_ref().map(|(op, _)| *op), Some(BinaryOp::Subtract));
}

#[test]
fn test_target_keyword_is_not_a_suffix() {
    let line = parse_line("5 to cm").unwrap();
    assert_eq!(line.left, Term::Scalar(Decimal::from(5)));
    assert_eq!(line.target.as_deref(), Some("cm"));

    let line = parse_line("2tbsp to tsp").unwrap();
    assert!(matches!(&line.left, Term::Quantity(lit) if lit.suffix == "tbsp"));
    assert_eq!(line.target.as_deref(), Some("tsp"));
}

#[test]
fn test_si_literals_never_round() {
    assert!(matches!(
        "0.0000000000000000004m".parse::<Quantity>(),
        Err(MeasureError::Overflow(_))
    ));
    assert_eq!(q("0.000000000000000004m").repr(), "#0.000000000000000004m");
}

#[test]
fn test_customary_fractions_must_be_exact() {
    assert!(matches!(
        "-1/1000000in".parse::<Quantity>(),
        Err(MeasureError::InvalidFractionSyntax(_))
    ));
    assert_eq!(q("1/64cup").amount() * 64, q("1cup").amount());
}
