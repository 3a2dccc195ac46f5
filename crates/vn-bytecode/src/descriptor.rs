use crate::expr::{Expression, LiveState};
use crate::parser::parse_expression;
use crate::token::TokenStream;
use crate::value::{DecodedValue, IntLocation};
use vn_core::{malformed_bail, Error, Point, Rect, Result};

/// How four decoded integers become a [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RectConvention {
    /// `(x1, y1, x2, y2)`, inclusive corners.
    Grp,
    /// `(x, y, width, height)`.
    Rec,
}

impl RectConvention {
    pub fn build(self, one: i32, two: i32, three: i32, four: i32) -> Rect {
        match self {
            RectConvention::Grp => Rect::grp(one, two, three, four),
            RectConvention::Rec => Rect::rec(one, two, three, four),
        }
    }
}

/// Static description of one parameter shape.
///
/// The set is closed: every shape x construction-policy pair is its own
/// variant, and decoding dispatches over it with a single `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    IntConstant,
    StrConstant,
    /// An integer variable; evaluates to its address, not its value.
    IntReference,
    /// An integer that may be omitted at the end of the list.
    DefaultInt(i32),
    Point,
    Rect(RectConvention),
    /// Zero or more repetitions of the inner shape, up to the end of the list.
    Argc(&'static TypeDescriptor),
}

pub const INT: TypeDescriptor = TypeDescriptor::IntConstant;
pub const STR: TypeDescriptor = TypeDescriptor::StrConstant;
pub const INT_REF: TypeDescriptor = TypeDescriptor::IntReference;
pub const POINT: TypeDescriptor = TypeDescriptor::Point;
pub const RECT_GRP: TypeDescriptor = TypeDescriptor::Rect(RectConvention::Grp);
pub const RECT_REC: TypeDescriptor = TypeDescriptor::Rect(RectConvention::Rec);
pub const ARGC_INT: TypeDescriptor = TypeDescriptor::Argc(&INT);
pub const ARGC_STR: TypeDescriptor = TypeDescriptor::Argc(&STR);

impl TypeDescriptor {
    pub fn name(&self) -> String {
        match self {
            TypeDescriptor::IntConstant => "int".to_string(),
            TypeDescriptor::StrConstant => "str".to_string(),
            TypeDescriptor::IntReference => "intref".to_string(),
            TypeDescriptor::DefaultInt(value) => format!("int = {}", value),
            TypeDescriptor::Point => "point".to_string(),
            TypeDescriptor::Rect(RectConvention::Grp) => "rect_grp".to_string(),
            TypeDescriptor::Rect(RectConvention::Rec) => "rect_rec".to_string(),
            TypeDescriptor::Argc(inner) => format!("{}...", inner.name()),
        }
    }

    /// Number of scalar sub-fields; `None` for variadic shapes.
    pub fn arity(&self) -> Option<usize> {
        match self {
            TypeDescriptor::IntConstant
            | TypeDescriptor::StrConstant
            | TypeDescriptor::IntReference
            | TypeDescriptor::DefaultInt(_) => Some(1),
            TypeDescriptor::Point => Some(2),
            TypeDescriptor::Rect(_) => Some(4),
            TypeDescriptor::Argc(_) => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, TypeDescriptor::Argc(_))
    }

    /// Parse-only pass: consume this shape's raw tokens and append their
    /// expressions to `output`. Never looks at live state.
    pub fn parse(&self, stream: &mut TokenStream<'_>, output: &mut Vec<Expression>) -> Result<()> {
        match self {
            TypeDescriptor::IntConstant => {
                let token = stream.next_token()?;
                output.push(parse_int(token)?);
            }
            TypeDescriptor::StrConstant => {
                let token = stream.next_token()?;
                let expr = parse_expression(token)?;
                if !expr.is_string() {
                    malformed_bail!("expected a string parameter, found `{}`", token);
                }
                output.push(expr);
            }
            TypeDescriptor::IntReference => {
                let token = stream.next_token()?;
                let expr = parse_expression(token)?;
                if !matches!(expr, Expression::IntRef { .. }) {
                    malformed_bail!("expected an integer variable, found `{}`", token);
                }
                output.push(expr);
            }
            TypeDescriptor::DefaultInt(value) => {
                if stream.is_exhausted() {
                    output.push(Expression::Int(*value));
                } else {
                    output.push(parse_int(stream.next_token()?)?);
                }
            }
            TypeDescriptor::Point => {
                INT.parse(stream, output)?;
                INT.parse(stream, output)?;
            }
            TypeDescriptor::Rect(_) => {
                for _ in 0..4 {
                    INT.parse(stream, output)?;
                }
            }
            TypeDescriptor::Argc(inner) => {
                if inner.is_complex() {
                    malformed_bail!("nested variadic parameter {}", self.name());
                }
                while !stream.is_exhausted() {
                    inner.parse(stream, output)?;
                }
            }
        }
        Ok(())
    }

    /// Evaluate the expressions produced by [`TypeDescriptor::parse`],
    /// starting at `cursor`, into one value.
    pub fn evaluate(
        &self,
        pieces: &[Expression],
        cursor: &mut usize,
        state: &dyn LiveState,
    ) -> Result<DecodedValue> {
        match self {
            TypeDescriptor::IntConstant | TypeDescriptor::DefaultInt(_) => {
                let value = next_piece(pieces, cursor)?.eval_int(state)?;
                Ok(DecodedValue::Int(value))
            }
            TypeDescriptor::StrConstant => {
                let value = next_piece(pieces, cursor)?.eval_str(state)?;
                Ok(DecodedValue::Str(value))
            }
            TypeDescriptor::IntReference => match next_piece(pieces, cursor)? {
                Expression::IntRef { bank, index } => {
                    let index = index.eval_int(state)?;
                    Ok(DecodedValue::IntLocation(IntLocation { bank: *bank, index }))
                }
                other => Err(Error::evaluation(format!(
                    "expected an integer variable, found {:?}",
                    other
                ))),
            },
            TypeDescriptor::Point => {
                let x = evaluate_int(pieces, cursor, state)?;
                let y = evaluate_int(pieces, cursor, state)?;
                Ok(DecodedValue::Point(Point::new(x, y)))
            }
            TypeDescriptor::Rect(convention) => {
                let one = evaluate_int(pieces, cursor, state)?;
                let two = evaluate_int(pieces, cursor, state)?;
                let three = evaluate_int(pieces, cursor, state)?;
                let four = evaluate_int(pieces, cursor, state)?;
                Ok(DecodedValue::Rect(convention.build(one, two, three, four)))
            }
            TypeDescriptor::Argc(inner) => {
                let mut items = Vec::new();
                while *cursor < pieces.len() {
                    items.push(inner.evaluate(pieces, cursor, state)?);
                }
                Ok(DecodedValue::List(items))
            }
        }
    }

    /// Parse and evaluate in one pass.
    ///
    /// Every sub-field is parsed before any is evaluated, so the number of
    /// tokens consumed never depends on live state.
    pub fn decode(&self, stream: &mut TokenStream<'_>, state: &dyn LiveState) -> Result<DecodedValue> {
        let mut pieces = Vec::new();
        self.parse(stream, &mut pieces)?;
        let mut cursor = 0;
        self.evaluate(&pieces, &mut cursor, state)
    }
}

fn parse_int(token: &str) -> Result<Expression> {
    let expr = parse_expression(token)?;
    if expr.is_string() {
        malformed_bail!("expected an integer parameter, found `{}`", token);
    }
    Ok(expr)
}

fn next_piece<'a>(pieces: &'a [Expression], cursor: &mut usize) -> Result<&'a Expression> {
    let piece = pieces
        .get(*cursor)
        .ok_or_else(|| Error::malformed("parsed parameter pieces exhausted"))?;
    *cursor += 1;
    Ok(piece)
}

fn evaluate_int(pieces: &[Expression], cursor: &mut usize, state: &dyn LiveState) -> Result<i32> {
    next_piece(pieces, cursor)?.eval_int(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{IntBank, StrBank};
    use pretty_assertions::assert_eq;

    struct Fixed;

    impl LiveState for Fixed {
        fn read_int(&self, _bank: IntBank, index: i32) -> Result<i32> {
            if index < 0 {
                return Err(Error::evaluation("negative index"));
            }
            Ok(index * 10)
        }

        fn read_str(&self, _bank: StrBank, index: i32) -> Result<String> {
            Ok(format!("s{index}"))
        }

        fn store(&self) -> i32 {
            0
        }
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn decode(descriptor: &TypeDescriptor, items: &[&str]) -> Result<DecodedValue> {
        let raw = tokens(items);
        let mut stream = TokenStream::new(&raw);
        descriptor.decode(&mut stream, &Fixed)
    }

    #[test]
    fn point_from_two_scalars() {
        assert_eq!(
            decode(&POINT, &["10", "20"]).unwrap(),
            DecodedValue::Point(Point::new(10, 20))
        );
    }

    #[test]
    fn rect_policies_differ_on_identical_tokens() {
        let grp = decode(&RECT_GRP, &["0", "0", "100", "50"]).unwrap();
        let rec = decode(&RECT_REC, &["0", "0", "100", "50"]).unwrap();
        assert_eq!(grp, DecodedValue::Rect(Rect::rec(0, 0, 101, 51)));
        assert_eq!(rec, DecodedValue::Rect(Rect::rec(0, 0, 100, 50)));
        assert_ne!(grp, rec);
    }

    #[test]
    fn composite_reads_fields_in_encoding_order() {
        let rect = decode(&RECT_REC, &["1", "2", "3", "4"]).unwrap();
        assert_eq!(rect, DecodedValue::Rect(Rect::rec(1, 2, 3, 4)));
    }

    #[test]
    fn extreme_grp_corners_decode_without_overflow() {
        let value = decode(&RECT_GRP, &["-2147483648", "0", "2147483647", "10"]).unwrap();
        let DecodedValue::Rect(rect) = value else {
            panic!("expected a rect, got {value:?}");
        };
        assert_eq!(rect.origin, Point::new(i32::MIN, 0));
        assert!(rect.is_empty());
    }

    #[test]
    fn short_stream_is_malformed() {
        let err = decode(&RECT_GRP, &["0", "0", "100"]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn composite_parses_every_field_before_evaluating() {
        let raw = tokens(&["intA[-1]", "5"]);
        let mut stream = TokenStream::new(&raw);
        let err = POINT.decode(&mut stream, &Fixed).unwrap_err();
        assert!(matches!(err, Error::Evaluation { .. }));
        assert_eq!(stream.consumed(), 2);
    }

    #[test]
    fn reference_evaluates_only_the_index() {
        let value = decode(&INT_REF, &["intC[1 + 2]"]).unwrap();
        assert_eq!(
            value,
            DecodedValue::IntLocation(IntLocation {
                bank: IntBank::C,
                index: 3
            })
        );
        assert!(decode(&INT_REF, &["3"]).unwrap_err().is_malformed());
    }

    #[test]
    fn string_and_int_shapes_are_checked_at_parse_time() {
        assert_eq!(
            decode(&STR, &["strS[2]"]).unwrap(),
            DecodedValue::Str("s2".to_string())
        );
        assert!(decode(&STR, &["2"]).unwrap_err().is_malformed());
        assert!(decode(&INT, &["\"2\""]).unwrap_err().is_malformed());
    }

    #[test]
    fn default_int_consumes_nothing_when_absent() {
        let optional = TypeDescriptor::DefaultInt(7);
        let raw: Vec<String> = Vec::new();
        let mut stream = TokenStream::new(&raw);
        assert_eq!(optional.decode(&mut stream, &Fixed).unwrap(), DecodedValue::Int(7));
        assert_eq!(stream.consumed(), 0);
        assert_eq!(decode(&optional, &["intA[2]"]).unwrap(), DecodedValue::Int(20));
    }

    #[test]
    fn argc_repeats_until_exhausted() {
        let points = TypeDescriptor::Argc(&POINT);
        assert_eq!(
            decode(&points, &["1", "2", "3", "4"]).unwrap(),
            DecodedValue::List(vec![
                DecodedValue::Point(Point::new(1, 2)),
                DecodedValue::Point(Point::new(3, 4)),
            ])
        );
        assert!(decode(&points, &["1", "2", "3"]).unwrap_err().is_malformed());
        assert_eq!(decode(&ARGC_INT, &[]).unwrap(), DecodedValue::List(vec![]));
    }

    #[test]
    fn shape_metadata() {
        assert_eq!(RECT_GRP.arity(), Some(4));
        assert_eq!(POINT.arity(), Some(2));
        assert_eq!(ARGC_STR.arity(), None);
        assert!(ARGC_STR.is_complex());
        assert!(!RECT_REC.is_complex());
        assert_eq!(TypeDescriptor::Argc(&RECT_REC).name(), "rect_rec...");
    }
}
