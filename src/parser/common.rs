use std::str::FromStr;

use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::{eof, map_res, value};
use nom::sequence::{pair, preceded, terminated};
use nom::IResult;

/// A run of non-whitespace characters
pub fn word(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

/// A whitespace-separated word following the current position
pub fn arg(input: &str) -> IResult<&str, &str> {
    preceded(space1, word)(input)
}

pub fn integer<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, |digits: &str| digits.parse::<T>())(input)
}

/// Only trailing whitespace remains on the line
pub fn line_end(input: &str) -> IResult<&str, ()> {
    value((), pair(space0, eof))(input)
}

/// The `$end` keyword closing a directive as the last token on the line
pub fn end(input: &str) -> IResult<&str, ()> {
    value((), terminated(preceded(space1, tag("$end")), line_end))(input)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{arg, end, integer, word};

    #[test]
    fn parse_words() -> Result<(), Box<dyn Error>> {
        let (rest, value) = word("abc def")?;
        assert_eq!((rest, value), (" def", "abc"));

        let (rest, value) = arg("  def")?;
        assert_eq!((rest, value), ("", "def"));

        assert!(word(" abc").is_err());
        Ok(())
    }

    #[test]
    fn parse_integer() -> Result<(), Box<dyn Error>> {
        let (rest, value) = integer::<u32>("128 x")?;

        assert_eq!(rest, " x");
        assert_eq!(value, 128);
        assert!(integer::<u8>("300").is_err());
        Ok(())
    }

    #[test]
    fn parse_end() {
        assert!(end(" $end").is_ok());
        assert!(end(" $end  ").is_ok());
        assert!(end("$end").is_err());
        assert!(end(" $endx").is_err());
        assert!(end(" $end extra").is_err());
    }
}
