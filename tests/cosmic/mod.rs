mod almanac;
