pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_blanks() {
        assert_eq!(split_csv(" gift-box, ,arcade,"), vec!["gift-box", "arcade"]);
        assert!(split_csv("").is_empty());
    }
}
