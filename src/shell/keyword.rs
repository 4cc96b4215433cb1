use strum::EnumString;

/// Command words recognized by the shell.
///
/// These keywords are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Keyword {
    Insert,
    Select,
    Join,
    #[strum(serialize = "Aggregate", serialize = "Agg")]
    Aggregate,
    Tables,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword() {
        assert_eq!("select".parse::<Keyword>().unwrap(), Keyword::Select);
        assert_eq!("JOIN".parse::<Keyword>().unwrap(), Keyword::Join);
        assert_eq!("agg".parse::<Keyword>().unwrap(), Keyword::Aggregate);
        assert!("update".parse::<Keyword>().is_err());
    }
}
