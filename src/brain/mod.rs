pub mod provider;
pub mod verdict;

#[cfg(test)]
pub(crate) mod test_helpers;
