#[cfg(test)]
mod mocks;
#[cfg(test)]
mod scenarios;
