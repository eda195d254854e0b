pub struct Config {
    pub page_size: usize,
}

#[cfg(test)]
mod tests {
    struct Fixture;
}
