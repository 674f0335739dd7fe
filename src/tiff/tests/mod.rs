mod test_utils;
